//! API keys stored as plain-text files.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key file '{}' not found", .0.display())]
    Missing(PathBuf),

    #[error("API key file '{}' is empty", .0.display())]
    Empty(PathBuf),

    #[error("failed to read API key file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read a key from `path`, trimmed of surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String, CredentialError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CredentialError::Missing(path.to_path_buf())
        } else {
            CredentialError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let key = content.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty(path.to_path_buf()));
    }
    Ok(key.to_string())
}
