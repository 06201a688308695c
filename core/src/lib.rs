use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use persist::*;
pub use types::*;
pub use updates::*;

mod cell;
mod engine;
mod error;
mod generator;
mod persist;
mod types;
mod updates;

/// Largest mine count that can always be placed on a board of `size`,
/// whichever cell is clicked first.
///
/// The first click and its neighbors never hold a mine, so the biggest
/// block that can be excluded (3x3, or smaller on thin boards) is
/// subtracted from the total.
pub const fn max_mines((size_x, size_y): Coord2) -> CellCount {
    if size_x <= 0 || size_y <= 0 {
        return 0;
    }
    let excluded_x = if size_x < 3 { size_x } else { 3 };
    let excluded_y = if size_y < 3 { size_y } else { 3 };
    mult(size_x, size_y) - mult(excluded_x, excluded_y)
}

/// Largest number of cheats allowed on a board of `size`, the square root of
/// its cell count.
pub const fn max_cheats((size_x, size_y): Coord2) -> u8 {
    let root = mult(size_x, size_y).isqrt();
    if root > u8::MAX as CellCount {
        u8::MAX
    } else {
        root as u8
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
    pub cheats: u8,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount, cheats: u8) -> Self {
        Self {
            size,
            mines,
            cheats,
        }
    }

    pub fn new(size: Coord2, mines: CellCount, cheats: u8) -> Result<Self> {
        let config = Self::new_unchecked(size, mines, cheats);
        config.validate()?;
        Ok(config)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10, 0)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40, 1)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((30, 16), 99, 3)
    }

    pub fn validate(&self) -> Result<()> {
        let (size_x, size_y) = self.size;
        if size_x <= 0 || size_y <= 0 {
            return Err(GameError::InvalidSize);
        }

        let max = max_mines(self.size);
        if self.mines > max {
            return Err(GameError::TooManyMines {
                mines: self.mines,
                max,
            });
        }

        let max = max_cheats(self.size);
        if self.cheats > max {
            return Err(GameError::TooManyCheats {
                cheats: self.cheats,
                max,
            });
        }

        Ok(())
    }

    /// Parses and validates a configuration, e.g. from a settings file.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| GameError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| GameError::Encode(err.to_string()))
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::beginner()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::beginner(),
            Self::Intermediate => GameConfig::intermediate(),
            Self::Expert => GameConfig::expert(),
        }
    }
}

/// Kind of click a player performs on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickAction {
    /// Reveal a cell, or chord an already revealed number.
    Default,
    /// Cycle flag, red mark and nothing.
    Flag,
    /// Cycle through the mark colors.
    Mark,
    /// Reveal a cell without losing on a mine, using up one cheat.
    Cheat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Layout with no mines at all.
    pub fn empty(size: Coord2) -> Self {
        let size = (size.0.max(0), size.1.max(0));
        Self {
            mine_mask: Array2::default(size.to_nd_index()),
            mine_count: 0,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 <= 0 || size.1 <= 0 {
            return Err(GameError::InvalidSize);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        nd_size(&self.mine_mask)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// Whether `coords` holds a mine, `false` when out of bounds.
    pub fn contains_mine(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.size()) && self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    /// Removes every mine, keeping the size.
    pub fn clear(&mut self) {
        self.mine_mask.fill(false);
        self.mine_count = 0;
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        iter_coords(self.size()).filter(|&coords| self[coords])
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Outcome of a click, as seen by whoever drives the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    NoChange,
    Changed,
    Lost,
    Won,
}

impl ClickOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        use ClickOutcome::*;
        match self {
            NoChange => false,
            Changed => true,
            Lost => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when a click touches several cells
impl BitOr for ClickOutcome {
    type Output = ClickOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use ClickOutcome::*;
        match (self, rhs) {
            (Lost, _) => Lost,
            (_, Lost) => Lost,
            (Won, _) => Won,
            (_, Won) => Won,
            (Changed, _) => Changed,
            (_, Changed) => Changed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
