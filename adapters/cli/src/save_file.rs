use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tilefall_core::SessionSnapshot;
use tilefall_world::save::{self, SaveError};

/// Failures while reading or writing the save file.
#[derive(Debug, Error)]
pub(crate) enum SaveFileError {
    /// The file exists but does not hold a valid save.
    #[error("Error reading file; Invalid savefile syntax.")]
    Corrupt {
        /// File that was read or written.
        path: PathBuf,
        /// What was wrong with its contents.
        #[source]
        source: SaveError,
    },
    /// The file could not be read or written.
    #[error("failed to access save file {}", path.display())]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Reads the session stored at `path`; a missing file yields `None`.
pub(crate) fn load(path: &Path) -> Result<Option<SessionSnapshot>, SaveFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            log::info!("no save at {}, starting a new game", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SaveFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    save::decode(&text)
        .map(Some)
        .map_err(|source| SaveFileError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Overwrites `path` with the session.
pub(crate) fn store(path: &Path, snapshot: &SessionSnapshot) -> Result<(), SaveFileError> {
    let text = save::encode(snapshot).map_err(|source| SaveFileError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    write(path, &text)?;
    log::info!("saved session to {}", path.display());
    Ok(())
}

/// Overwrites `path` with the game-over note.
pub(crate) fn store_game_over(path: &Path, score: u64) -> Result<(), SaveFileError> {
    write(path, &save::game_over_note(score))
}

fn write(path: &Path, text: &str) -> Result<(), SaveFileError> {
    fs::write(path, text).map_err(|source| SaveFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
