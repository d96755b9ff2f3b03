//! Sharekit Local Store
//!
//! Persists small typed values in a flat key-value store:
//! - [`KeyValueStore`] trait for the backing store (string keys, string values)
//! - [`MemoryKeyValueStore`] for tests and ephemeral sessions
//! - [`FileKeyValueStore`] keeping every key in one JSON file on disk
//! - [`PersistentValue`] holding a value in memory and writing it through on change
//!
//! Store failures never reach the holder of a [`PersistentValue`]: reads fall back
//! to the default and writes are logged, leaving memory and store to diverge.

use thiserror::Error;

pub mod file;
pub mod memory;
pub mod value;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use value::PersistentValue;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Key-value store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key-value serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key-value store unavailable: {0}")]
    Unavailable(String),
}

/// Flat string key-value store, synchronous from the caller's perspective
pub trait KeyValueStore {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<(), KvError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).write(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).write(key, value)
    }
}
