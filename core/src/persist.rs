use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::*;

/// Version written into every save, bumped whenever the engine layout changes.
pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveFileRef<'a> {
    version: u32,
    engine: &'a Engine,
}

#[derive(Deserialize)]
struct SaveFile {
    version: u32,
    engine: serde_json::Value,
}

fn corrupt(err: impl ToString) -> GameError {
    let err = GameError::CorruptSave(err.to_string());
    log::warn!("Rejected save data: {}", err);
    err
}

fn io_error(err: std::io::Error) -> GameError {
    GameError::Io(err.to_string())
}

impl Engine {
    /// Encodes the whole engine, mine layout included.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let save = SaveFileRef {
            version: SAVE_FORMAT_VERSION,
            engine: self,
        };
        serde_json::to_vec(&save).map_err(|err| GameError::Encode(err.to_string()))
    }

    /// Restores an engine saved with [`Engine::to_bytes`].
    ///
    /// A failed load never touches any existing engine, callers keep playing
    /// whatever they had.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let save: SaveFile = serde_json::from_slice(bytes).map_err(corrupt)?;
        if save.version != SAVE_FORMAT_VERSION {
            log::warn!("Rejected save with version {}", save.version);
            return Err(GameError::UnsupportedSaveVersion(save.version));
        }

        let engine: Engine = serde_json::from_value(save.engine).map_err(corrupt)?;
        if let Err(err) = engine.validate() {
            log::warn!("Rejected save data: {}", err);
            return Err(err);
        }

        log::debug!(
            "Loaded {:?} game on {:?}",
            engine.state(),
            engine.size()
        );
        Ok(engine)
    }

    pub fn save_to_writer(&self, mut writer: impl Write) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }

    pub fn load_from_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(io_error)?;
        Self::from_bytes(&bytes)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(io_error)?;
        self.save_to_writer(BufWriter::new(file))?;
        log::debug!("Saved game to {}", path.display());
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(io_error)?;
        Self::load_from_reader(BufReader::new(file))
    }
}
