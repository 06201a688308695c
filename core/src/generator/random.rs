use super::*;
use rand::prelude::*;

/// Generation strategy that draws uniformly random cells and throws away any
/// draw landing on the start cell, on an existing mine, or next to the start.
#[derive(Clone, Debug)]
pub struct RejectionSampler {
    rng: SmallRng,
}

impl RejectionSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed for whatever generation comes after this one.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl MineGenerator for RejectionSampler {
    fn generate(&mut self, config: &GameConfig, start: Coord2) -> MineLayout {
        let size = config.size;
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());
        let excluded: Vec<Coord2> = mines.iter_neighbors(start).collect();

        let start_cells = if in_bounds(start, size) { 1 } else { 0 };
        let placeable = config.total_cells() - start_cells - excluded.len() as CellCount;
        let target = if config.mines > placeable {
            log::warn!(
                "Minefield too dense, requested {} but only {} fit around {:?}",
                config.mines,
                placeable,
                start
            );
            placeable
        } else {
            config.mines
        };

        let mut mines_placed: CellCount = 0;
        let mut draws: u64 = 0;
        while mines_placed < target {
            let pos: Coord2 = (
                self.rng.random_range(0..size.0),
                self.rng.random_range(0..size.1),
            );
            draws += 1;

            if pos == start || mines[pos.to_nd_index()] {
                continue;
            }

            mines[pos.to_nd_index()] = true;
            mines_placed += 1;

            // retract anything that landed next to the start
            if excluded.contains(&pos) {
                mines[pos.to_nd_index()] = false;
                mines_placed -= 1;
            }
        }

        log::debug!(
            "Placed {} mines on {:?} around {:?} after {} draws",
            mines_placed,
            size,
            start,
            draws
        );
        MineLayout::from_mine_mask(mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(config: GameConfig, seed: u64, start: Coord2) -> MineLayout {
        RejectionSampler::new(seed).generate(&config, start)
    }

    #[test]
    fn places_exact_count() {
        for seed in 0..20 {
            let layout = generate(GameConfig::expert(), seed, (10, 7));
            assert_eq!(layout.mine_count(), 99);
            assert_eq!(layout.iter_mines().count(), 99);
        }
    }

    #[test]
    fn keeps_start_and_neighbors_clear() {
        for seed in 0..50 {
            let start = (4, 4);
            let layout = generate(GameConfig::beginner(), seed, start);
            assert!(!layout.contains_mine(start));
            for pos in NeighborIter::new(start, (9, 9)) {
                assert!(!layout.contains_mine(pos), "mine next to start at {pos:?}");
            }
        }
    }

    #[test]
    fn fills_every_placeable_cell_when_dense() {
        let config = GameConfig::new((4, 4), 7, 0).unwrap();
        let layout = generate(config, 7, (1, 1));
        assert_eq!(layout.mine_count(), 7);
        for coords in iter_coords((4, 4)) {
            let outside_block = coords.0 == 3 || coords.1 == 3;
            assert_eq!(layout.contains_mine(coords), outside_block, "at {coords:?}");
        }
    }

    #[test]
    fn corner_start_fills_rest_of_board() {
        let config = GameConfig::new((4, 4), 7, 0).unwrap();
        let layout = generate(config, 3, (0, 0));
        assert_eq!(layout.mine_count(), 7);
        assert!(!layout.contains_mine((0, 0)));
        assert!(!layout.contains_mine((1, 1)));
    }

    #[test]
    fn same_seed_same_layout() {
        let a = generate(GameConfig::intermediate(), 1234, (0, 0));
        let b = generate(GameConfig::intermediate(), 1234, (0, 0));
        assert_eq!(a, b);
    }

    #[test]
    fn dense_request_is_clamped() {
        let config = GameConfig::new_unchecked((3, 3), 5, 0);
        let layout = generate(config, 0, (1, 1));
        assert_eq!(layout.mine_count(), 0);
    }
}
