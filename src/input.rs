//! Choosing the text to annotate.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Text annotated when no file argument is given.
pub const DEFAULT_TEXT: &str =
    "All happy families are alike. Every unhappy family is unhappy in its own way";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a file's full contents as text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn read_input(path: &Path) -> Result<String, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolve the program argument to the text to annotate.
///
/// - no argument: [`DEFAULT_TEXT`]
/// - readable file: its contents
/// - unreadable file: empty text, with a warning; the run continues
pub fn resolve(argument: Option<&Path>) -> String {
    match argument {
        None => DEFAULT_TEXT.to_string(),
        Some(path) => read_input(path).unwrap_or_else(|e| {
            warn!("{}; continuing with empty text", e);
            String::new()
        }),
    }
}
