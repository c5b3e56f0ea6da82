//! Error kinds surfaced by this crate. Emulated exceptions (illegal opcodes,
//! unusable-range accesses, writes to read-only regions) are not represented
//! here: those are silently tolerated as part of ordinary `step()` behavior,
//! logged at `trace`/`debug` rather than surfaced as `Err`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GameboyError {
    #[error("could not read ROM at {path}: {source}")]
    RomUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read save file at {path}: {source}")]
    SaveUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invariant violation: {detail}")]
    InvariantViolation { detail: String },
}

impl GameboyError {
    pub fn invariant(detail: impl Into<String>) -> Self {
        GameboyError::InvariantViolation {
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameboyError>;
