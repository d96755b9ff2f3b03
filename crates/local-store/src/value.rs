//! Write-through persisted value

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{KeyValueStore, KvError};

/// A typed value kept in memory and mirrored to a [`KeyValueStore`] under one key.
///
/// The stored representation is the JSON encoding of `T`. Construction reads the
/// store once; every [`set`](Self::set) writes the new value back. Store errors are
/// logged and swallowed: a failed read yields the default, a failed write leaves the
/// in-memory value in place even though the store still holds the old one.
#[derive(Debug)]
pub struct PersistentValue<T, S> {
    store: S,
    key: String,
    value: T,
}

impl<T, S> PersistentValue<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Load `key` from `store`, or fall back to `default`. Never writes.
    pub fn new(store: S, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match Self::load(&store, &key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to read persisted value, using default");
                default
            }
        };

        Self { store, key, value }
    }

    fn load(store: &S, key: &str) -> Result<Option<T>, KvError> {
        match store.read(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value and write it through to the store
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Compute the next value from the current one, then write it through
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.value)
            .map_err(KvError::from)
            .and_then(|raw| self.store.write(&self.key, &raw));

        if let Err(e) = result {
            tracing::error!(error = %e, key = %self.key, "Failed to write persisted value");
        }
    }
}
