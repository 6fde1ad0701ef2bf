//! Local record store.
//!
//! # Overview
//!
//! The session cache persists through a plain string key/value interface so it
//! can run against any backend:
//!
//! - **MemoryStore** - in-process map, used by tests and short-lived tools
//! - **FileStore** - a single JSON object on disk
//!
//! The store knows nothing about sessions. Keeping ids unique and payloads
//! well-formed is the cache's job.
//!
//! # File Location
//!
//! ```text
//! ~/.config/sessiondock/
//! ├── config.json        # LauncherConfig
//! └── store.json         # FileStore: { "<key>": "<value>", ... }
//! ```

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed persistence used by the session cache.
///
/// Implementations use interior mutability so a store can be shared between
/// the cache and whoever else needs to inspect it.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
