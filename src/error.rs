//! Error taxonomy for resource loading and instance management.
//!
//! Per-entry problems (a map entry missing its id, an unknown script
//! engine) are logged and skipped by the callers; whole-bundle problems
//! surface here and abort the operation with no partial state.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    /// The game type is not registered in the global configuration.
    #[error("game type '{game}' is not registered")]
    GameNotFound { game: String },

    /// A configuration document is missing, empty, or malformed, or an
    /// entry that must be present is not.
    #[error("faulty configuration: {0}")]
    FaultyConfiguration(String),

    /// No map satisfies the request (e.g. a random playable map was asked
    /// for and every map is the lobby). A runtime condition, not a
    /// load-time one.
    #[error("no suitable map is available for game '{game}'")]
    MapNotFound { game: String },

    /// The script file exists but its extension maps to no known engine.
    #[error("no script engine handles {}", path.display())]
    ScriptEngineNotFound { path: PathBuf },

    /// An I/O failure, carrying the path it happened on.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl GameError {
    pub(crate) fn faulty(message: impl Into<String>) -> Self {
        GameError::FaultyConfiguration(message.into())
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        GameError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
