//! Platform error types

use std::path::PathBuf;
use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Key contains characters that cannot be mapped to storage
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Failed to read a stored value
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
