use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board size")]
    InvalidSize,
    #[error("Too many mines, requested {mines} but at most {max} can be placed")]
    TooManyMines { mines: CellCount, max: CellCount },
    #[error("Too many cheats, requested {cheats} but at most {max} are allowed")]
    TooManyCheats { cheats: u8, max: u8 },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Could not encode game: {0}")]
    Encode(String),
    #[error("Corrupt save data: {0}")]
    CorruptSave(String),
    #[error("Unsupported save version {0}")]
    UnsupportedSaveVersion(u32),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
