//! Theme error types
//!
//! None of these are fatal: the engine logs them and falls back to the
//! cache, the built-in defaults, or the OS preference.

use lumen_core::ColorParseError;
use lumen_platform::PlatformError;
use thiserror::Error;

/// Failure fetching the remote settings snapshot
#[derive(Error, Debug)]
pub enum FetchError {
    /// Remote unreachable
    #[error("settings service unreachable: {0}")]
    Network(String),

    /// Remote answered with a non-success status
    #[error("settings service returned status {0}")]
    Status(u16),

    /// Response body was not a settings object
    #[error("malformed settings response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Recoverable errors raised while reconciling the theme
#[derive(Error, Debug)]
pub enum ThemeError {
    /// Remote settings could not be fetched
    #[error("network fetch failed: {0}")]
    NetworkFetch(#[from] FetchError),

    /// A persisted cache entry could not be decoded
    #[error("cached {key} is malformed: {source}")]
    CacheParse {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for the cache
    #[error("failed to encode {key}: {source}")]
    CacheEncode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A settings value is outside its accepted range
    #[error("invalid {field}: {value}")]
    Validation { field: &'static str, value: String },

    /// A color string could not be parsed
    #[error("invalid color: {0}")]
    Color(#[from] ColorParseError),

    /// The storage backend failed
    #[error(transparent)]
    Storage(#[from] PlatformError),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
