//! Lumen Platform
//!
//! Durable client-side storage used to cache resolved theme settings between
//! runs. Storage is a flat string key/value space, like a browser's
//! `localStorage`:
//!
//! - [`MemoryStorage`]: process-local, shared between clones (tests, previews)
//! - [`FileStorage`]: one file per key in a directory, replaced atomically

pub mod error;
pub mod storage;

pub use error::{PlatformError, Result};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
