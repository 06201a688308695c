use serde::{Deserialize, Serialize};

/// Color of a free-form player mark.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkColor {
    Red,
    Green,
    Blue,
}

impl MarkColor {
    /// Next color in the mark cycle, `None` once the cycle is exhausted.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Red => Some(Self::Green),
            Self::Green => Some(Self::Blue),
            Self::Blue => None,
        }
    }
}

/// Player-visible state of a cell. An unset cell is represented by `None`
/// wherever an `Option<Cell>` is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Revealed safe cell with the number of adjacent mines.
    Number(u8),
    Flag,
    /// Flag that turned out to mark no mine, shown once the game ends.
    FlagNot,
    Mine,
    MineRed,
    /// The mine that ended the game.
    MineLost,
    /// Mine shown after a victory or uncovered with a cheat.
    MineSafe,
    Mark(MarkColor),
}

impl Cell {
    /// Number cell for `count` adjacent mines, `None` when out of `0..=8`.
    pub const fn from_count(count: u8) -> Option<Self> {
        if count <= 8 {
            Some(Self::Number(count))
        } else {
            None
        }
    }

    pub const fn kind(self) -> CellKind {
        match self {
            Self::Number(_) => CellKind::Number,
            Self::Flag => CellKind::Flag,
            Self::FlagNot => CellKind::FlagNot,
            Self::Mine => CellKind::Mine,
            Self::MineRed => CellKind::MineRed,
            Self::MineLost => CellKind::MineLost,
            Self::MineSafe => CellKind::MineSafe,
            Self::Mark(_) => CellKind::Mark,
        }
    }

    pub const fn number(self) -> Option<u8> {
        match self {
            Self::Number(count) => Some(count),
            _ => None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self.kind().traits().enabled
    }

    pub fn is_replaceable(self) -> bool {
        self.kind().traits().replaceable
    }

    pub fn is_number(self) -> bool {
        self.kind().traits().category == Some(CellCategory::Number)
    }

    pub fn is_mark(self) -> bool {
        self.kind().traits().category == Some(CellCategory::Mark)
    }

    pub fn is_flag(self) -> bool {
        self.kind().traits().category == Some(CellCategory::Flag)
    }

    pub fn is_mine(self) -> bool {
        self.kind().traits().category == Some(CellCategory::Mine)
    }
}

/// Payload-free tag of a cell state, including the unset state.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Unset,
    Number,
    Flag,
    FlagNot,
    Mine,
    MineRed,
    MineLost,
    MineSafe,
    Mark,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellCategory {
    Number,
    Flag,
    Mine,
    Mark,
}

/// Behavior shared by every cell of a given kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellTraits {
    /// Cell still looks raised and interactive.
    pub enabled: bool,
    /// A reveal, flag or mark may overwrite the cell.
    pub replaceable: bool,
    pub category: Option<CellCategory>,
}

const fn traits(enabled: bool, replaceable: bool, category: Option<CellCategory>) -> CellTraits {
    CellTraits {
        enabled,
        replaceable,
        category,
    }
}

// indexed by `CellKind as usize`
static CELL_TRAITS: [CellTraits; 9] = [
    traits(true, true, None),
    traits(false, false, Some(CellCategory::Number)),
    traits(true, false, Some(CellCategory::Flag)),
    traits(true, false, Some(CellCategory::Flag)),
    traits(true, true, Some(CellCategory::Mine)),
    traits(true, true, Some(CellCategory::Mine)),
    traits(true, true, Some(CellCategory::Mine)),
    traits(true, false, Some(CellCategory::Mine)),
    traits(true, true, Some(CellCategory::Mark)),
];

impl CellKind {
    pub const fn of(cell: Option<Cell>) -> Self {
        match cell {
            Some(cell) => cell.kind(),
            None => Self::Unset,
        }
    }

    pub fn traits(self) -> &'static CellTraits {
        &CELL_TRAITS[self as usize]
    }
}
