//! Locked file writes shared by the persisted stores.
//!
//! Two game instances of different types may flush their restoration or
//! tag documents at the same moment; an exclusive `fs2` lock serializes
//! the writers at the file so a reader never observes an interleaved
//! document.

use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::error::{GameError, Result};

/// Write `text` to `path`, holding an exclusive lock for the duration.
/// The file is truncated only after the lock is acquired.
pub(crate) fn write_locked(path: &Path, text: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .map_err(|e| GameError::io(path, e))?;
    file.lock_exclusive().map_err(|e| GameError::io(path, e))?;

    let result = (|| {
        file.set_len(0)?;
        let mut writer = &file;
        writer.write_all(text.as_bytes())?;
        writer.flush()
    })();

    let unlock = fs2::FileExt::unlock(&file);
    result.map_err(|e| GameError::io(path, e))?;
    unlock.map_err(|e| GameError::io(path, e))
}

/// Read a file to a string, mapping a missing file to `None`.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GameError::io(path, e)),
    }
}
