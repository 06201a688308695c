use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Valid transitions:
/// - Ready -> Active (first click places the mines)
/// - Ready -> Won / Lost (first click decides the game)
/// - Active -> Won / Lost
/// - any -> Ready (new game), any -> Ready / Active (restart)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No mines placed yet, the next reveal generates them
    #[default]
    Ready,
    /// Mines placed, game in progress
    Active,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Rules engine for a single board: owns the mines, what the player sees, and
/// the list of cells whose display changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    config: GameConfig,
    mine_layout: MineLayout,
    board: Array2<Option<Cell>>,
    flag_count: CellCount,
    cheats_remaining: u8,
    state: EngineState,
    triggered_mine: Option<Coord2>,
    seed: u64,
    pending_updates: UpdateQueue,
}

impl Engine {
    /// Engine with randomly seeded mine generation.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Engine whose mine layouts are reproducible from `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            config,
            mine_layout: MineLayout::empty(config.size),
            board: Array2::default(config.size.to_nd_index()),
            flag_count: 0,
            cheats_remaining: config.cheats,
            state: EngineState::Ready,
            triggered_mine: None,
            seed,
            pending_updates: UpdateQueue::new(),
        };
        engine.mark_all_updated();
        Ok(engine)
    }

    /// Engine over a fixed mine layout, ready to be played without generation.
    ///
    /// The layout is not held to [`max_mines`], so hand-made boards may be as
    /// dense as they like. A later [`Engine::new_game`] brings the mine count
    /// back within that bound.
    pub fn from_layout(mine_layout: MineLayout, cheats: u8) -> Result<Self> {
        let size = mine_layout.size();
        if mine_layout.total_cells() == 0 {
            return Err(GameError::InvalidSize);
        }
        let max = max_cheats(size);
        if cheats > max {
            return Err(GameError::TooManyCheats { cheats, max });
        }

        let config = GameConfig::new_unchecked(size, mine_layout.mine_count(), cheats);
        let mut engine = Self {
            config,
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            flag_count: 0,
            cheats_remaining: cheats,
            state: EngineState::Active,
            triggered_mine: None,
            seed: rand::random(),
            pending_updates: UpdateQueue::new(),
        };
        engine.mark_all_updated();
        Ok(engine)
    }

    /// Starts over with a fresh minefield, generated on the next reveal.
    pub fn new_game(&mut self) {
        let max = max_mines(self.size());
        if self.config.mines > max {
            log::warn!(
                "Lowering mine count from {} to {} for a generated field",
                self.config.mines,
                max
            );
            self.config.mines = max;
        }

        self.reset_session();
        self.mine_layout.clear();
        self.state = EngineState::Ready;
        log::debug!("New game on {:?} with {} mines", self.size(), self.total_mines());
        self.mark_all_updated();
    }

    /// Clears every revealed number, flag and mark but keeps the minefield.
    ///
    /// Before the first click there is no minefield yet, so the next reveal
    /// still generates one.
    pub fn restart(&mut self) {
        let had_layout = !self.state.is_ready();
        self.reset_session();
        self.state = if had_layout {
            EngineState::Active
        } else {
            EngineState::Ready
        };
        log::debug!("Restarted game, minefield kept: {}", had_layout);
        self.mark_all_updated();
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn width(&self) -> Coord {
        self.config.width()
    }

    pub fn height(&self) -> Coord {
        self.config.height()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn is_valid(&self, coords: Coord2) -> bool {
        in_bounds(coords, self.size())
    }

    /// Display state at `coords`, `None` when unset or out of bounds.
    pub fn get_cell(&self, coords: Coord2) -> Option<Cell> {
        if self.is_valid(coords) {
            self.cell(coords)
        } else {
            None
        }
    }

    pub fn is_enabled(&self, coords: Coord2) -> bool {
        self.is_valid(coords) && CellKind::of(self.cell(coords)).traits().enabled
    }

    pub fn is_replaceable(&self, coords: Coord2) -> bool {
        self.is_valid(coords) && CellKind::of(self.cell(coords)).traits().replaceable
    }

    /// Whether `coords` holds a mine. Always `false` before the first click.
    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn remaining_mines(&self) -> i64 {
        i64::from(self.config.mines) - i64::from(self.flag_count)
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn can_cheat(&self) -> bool {
        self.cheats_remaining > 0
    }

    pub fn cheats_remaining(&self) -> u8 {
        self.cheats_remaining
    }

    pub fn is_first_click_done(&self) -> bool {
        !self.state.is_ready()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_finished()
    }

    pub fn has_won(&self) -> bool {
        matches!(self.state, EngineState::Won)
    }

    /// In-bounds neighbors of `coords`, none when `coords` is out of bounds.
    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.pending_updates.is_empty()
    }

    /// Takes every coordinate whose display changed since the last drain.
    pub fn drain_updates(&mut self) -> Vec<Coord2> {
        self.pending_updates.drain()
    }

    /// Applies a click. Out-of-bounds clicks and clicks after the game ended
    /// are ignored.
    pub fn handle_click(&mut self, coords: Coord2, action: ClickAction) -> ClickOutcome {
        if self.state.is_finished() || !self.is_valid(coords) {
            log::trace!("Ignoring {:?} click at {:?}", action, coords);
            return ClickOutcome::NoChange;
        }

        match action {
            ClickAction::Default => self.default_click(coords),
            ClickAction::Flag => self.flag_click(coords),
            ClickAction::Mark => self.mark_click(coords),
            ClickAction::Cheat => self.cheat_click(coords),
        }
    }

    fn default_click(&mut self, coords: Coord2) -> ClickOutcome {
        self.ensure_mines(coords);

        let outcome = match self.cell(coords) {
            Some(Cell::Number(count)) => self.chord(coords, count),
            _ => self.activate(coords),
        };

        outcome | self.check_victory()
    }

    /// Cycles flag -> red mark -> nothing, placing flags only while some are left.
    fn flag_click(&mut self, coords: Coord2) -> ClickOutcome {
        match self.cell(coords) {
            Some(Cell::Flag) => {
                self.set_cell(coords, Some(Cell::Mark(MarkColor::Red)));
                self.flag_count = self.flag_count.saturating_sub(1);
                ClickOutcome::Changed
            }
            Some(cell) if cell.is_mark() => {
                self.set_cell(coords, None);
                ClickOutcome::Changed
            }
            _ if self.is_replaceable(coords) && self.flag_count < self.config.mines => {
                self.set_cell(coords, Some(Cell::Flag));
                self.flag_count += 1;
                ClickOutcome::Changed
            }
            _ => ClickOutcome::NoChange,
        }
    }

    fn mark_click(&mut self, coords: Coord2) -> ClickOutcome {
        match self.cell(coords) {
            Some(Cell::Mark(color)) => {
                self.set_cell(coords, color.next().map(Cell::Mark));
                ClickOutcome::Changed
            }
            _ if self.is_replaceable(coords) => {
                self.set_cell(coords, Some(Cell::Mark(MarkColor::Red)));
                ClickOutcome::Changed
            }
            _ => ClickOutcome::NoChange,
        }
    }

    fn cheat_click(&mut self, coords: Coord2) -> ClickOutcome {
        if !self.can_cheat() || !self.is_replaceable(coords) {
            return ClickOutcome::NoChange;
        }

        self.cheats_remaining -= 1;
        self.ensure_mines(coords);
        log::debug!(
            "Cheat used at {:?}, {} left",
            coords,
            self.cheats_remaining
        );

        let outcome = if self.mine_layout.contains_mine(coords) {
            self.set_cell(coords, Some(Cell::MineSafe));
            ClickOutcome::Changed
        } else {
            self.activate(coords)
        };

        outcome | self.check_victory()
    }

    /// Places the mines on the first reveal of a session.
    fn ensure_mines(&mut self, start: Coord2) {
        if !self.state.is_ready() {
            return;
        }

        let mut generator = RejectionSampler::new(self.seed);
        self.mine_layout = generator.generate(&self.config, start);
        self.seed = generator.next_seed();
        self.state = EngineState::Active;
        log::debug!("Game started at {:?}", start);
    }

    /// Reveals every neighbor of a number once enough flags surround it.
    fn chord(&mut self, coords: Coord2, count: u8) -> ClickOutcome {
        if self.count_flagged_neighbors(coords) != count {
            return ClickOutcome::NoChange;
        }

        let mut outcome = ClickOutcome::NoChange;
        for neighbor in self.neighbors(coords) {
            outcome = outcome | self.activate(neighbor);
            if self.state.is_finished() {
                break;
            }
        }
        outcome
    }

    /// Reveals a single cell, flood-filling when it has no adjacent mines.
    fn activate(&mut self, coords: Coord2) -> ClickOutcome {
        if !self.is_replaceable(coords) {
            return ClickOutcome::NoChange;
        }

        if self.mine_layout.contains_mine(coords) {
            self.lose(coords);
            return ClickOutcome::Lost;
        }

        let count = self.mine_layout.adjacent_mine_count(coords);
        self.set_cell(coords, Some(Cell::Number(count)));
        log::trace!("Revealed {:?}, mine count: {}", coords, count);

        if count == 0 {
            self.flood_fill(coords);
        }
        ClickOutcome::Changed
    }

    fn flood_fill(&mut self, origin: Coord2) {
        let mut visited = HashSet::from([origin]);
        let mut to_visit: VecDeque<Coord2> = self
            .neighbors(origin)
            .filter(|&pos| self.is_replaceable(pos))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            // flags, numbers and safe mines stay as they are
            if !self.is_replaceable(visit_coords) {
                continue;
            }

            // neighbors of a zero never hold a mine
            let visit_count = self.mine_layout.adjacent_mine_count(visit_coords);
            self.set_cell(visit_coords, Some(Cell::Number(visit_count)));

            if visit_count == 0 {
                to_visit.extend(
                    self.neighbors(visit_coords)
                        .filter(|&pos| self.is_replaceable(pos))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn lose(&mut self, coords: Coord2) {
        self.state = EngineState::Lost;
        self.triggered_mine = Some(coords);
        log::debug!("Mine hit at {:?}", coords);
        self.terminal_reveal(Some(coords), Cell::Mine);
    }

    /// Ends the game as won once every safe cell shows its number.
    fn check_victory(&mut self) -> ClickOutcome {
        if self.state.is_finished() {
            return ClickOutcome::NoChange;
        }

        let cleared = iter_coords(self.size()).all(|coords| {
            self.mine_layout.contains_mine(coords) || self.cell(coords).is_some_and(Cell::is_number)
        });
        if !cleared {
            return ClickOutcome::NoChange;
        }

        self.state = EngineState::Won;
        self.triggered_mine = None;
        log::debug!("Game won");
        self.terminal_reveal(None, Cell::MineSafe);
        ClickOutcome::Won
    }

    /// Shows every mine and every wrong flag once the game is decided.
    fn terminal_reveal(&mut self, triggered: Option<Coord2>, mine_cell: Cell) {
        for coords in iter_coords(self.size()) {
            let cell = self.cell(coords);
            if Some(coords) == triggered {
                self.set_cell(coords, Some(Cell::MineLost));
            } else if self.mine_layout.contains_mine(coords) {
                if cell.is_none_or(Cell::is_mark) {
                    self.set_cell(coords, Some(mine_cell));
                }
            } else if cell == Some(Cell::Flag) {
                self.set_cell(coords, Some(Cell::FlagNot));
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self.cell(pos) == Some(Cell::Flag))
            .count() as u8
    }

    fn reset_session(&mut self) {
        self.board.fill(None);
        self.flag_count = 0;
        self.cheats_remaining = self.config.cheats;
        self.triggered_mine = None;
        self.pending_updates.clear();
    }

    fn mark_all_updated(&mut self) {
        self.pending_updates.extend(iter_coords(self.size()));
    }

    /// Unchecked read, `coords` must be in bounds.
    fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.board[coords.to_nd_index()]
    }

    fn set_cell(&mut self, coords: Coord2, cell: Option<Cell>) {
        self.board[coords.to_nd_index()] = cell;
        self.pending_updates.push(coords);
    }

    /// Checks the internal consistency of an engine that came from outside,
    /// e.g. a save file.
    pub(crate) fn validate(&self) -> Result<()> {
        let corrupt = |reason: &str| Err(GameError::CorruptSave(reason.into()));

        let (size_x, size_y) = self.config.size;
        if size_x <= 0 || size_y <= 0 {
            return Err(GameError::InvalidSize);
        }
        // fields still to be generated must fit around any first click
        let max = if self.state.is_ready() {
            max_mines(self.config.size)
        } else {
            self.config.total_cells()
        };
        if self.config.mines > max {
            return Err(GameError::TooManyMines {
                mines: self.config.mines,
                max,
            });
        }
        let max = max_cheats(self.config.size);
        if self.config.cheats > max {
            return Err(GameError::TooManyCheats {
                cheats: self.config.cheats,
                max,
            });
        }
        if nd_size(&self.board) != self.config.size || self.mine_layout.size() != self.config.size
        {
            return corrupt("board shape does not match declared size");
        }

        let placed = self.mine_layout.iter_mines().count() as CellCount;
        if placed != self.mine_layout.mine_count() {
            return corrupt("mine count does not match minefield");
        }
        if self.state.is_ready() {
            if placed != 0 {
                return corrupt("mines placed before the first click");
            }
        } else if placed > self.config.mines {
            return corrupt("minefield holds more mines than configured");
        }

        for coords in iter_coords(self.config.size) {
            let has_mine = self.mine_layout.contains_mine(coords);
            match self.cell(coords) {
                Some(Cell::Number(_)) if self.state.is_ready() => {
                    return corrupt("revealed cell before the first click");
                }
                Some(Cell::Number(_)) if has_mine => {
                    return corrupt("revealed number on a mine");
                }
                Some(Cell::Number(count))
                    if count != self.mine_layout.adjacent_mine_count(coords) =>
                {
                    return corrupt("revealed number does not match the minefield");
                }
                Some(cell) if cell.is_mine() && !has_mine => {
                    return corrupt("mine shown where there is none");
                }
                Some(Cell::FlagNot) if has_mine => {
                    return corrupt("wrong flag on a mine");
                }
                _ => {}
            }
        }
        let flags = self.board.iter().filter(|cell| cell.is_some_and(Cell::is_flag)).count();
        if flags as CellCount != self.flag_count || self.flag_count > self.config.mines {
            return corrupt("flag count does not match the board");
        }
        if self.cheats_remaining > self.config.cheats {
            return corrupt("more cheats left than allowed");
        }

        match (self.state, self.triggered_mine) {
            (EngineState::Lost, Some(coords)) if self.mine_layout.contains_mine(coords) => {}
            (EngineState::Lost, _) => return corrupt("lost game without a triggered mine"),
            (_, None) => {}
            (_, Some(_)) => return corrupt("triggered mine in a game that was not lost"),
        }

        if self.pending_updates.iter().any(|coords| !self.is_valid(coords)) {
            return corrupt("pending update out of bounds");
        }

        Ok(())
    }
}
