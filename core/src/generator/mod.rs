use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    /// Lays out `config.mines` mines, keeping `start` and its neighbors clear.
    fn generate(&mut self, config: &GameConfig, start: Coord2) -> MineLayout;
}
