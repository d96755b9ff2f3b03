//! In-memory key-value store
//!
//! Clones share the same underlying map, so a test can keep one handle to
//! inspect what a [`crate::PersistentValue`] wrote through another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{KeyValueStore, KvError};

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<Mutex<bool>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail until reset
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_reads.lock() {
            *flag = fail;
        }
    }

    /// Make every subsequent write fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flag(flag: &Mutex<bool>) -> bool {
        flag.lock().map(|f| *f).unwrap_or(false)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, KvError> {
        if Self::flag(&self.fail_reads) {
            return Err(KvError::Unavailable("reads disabled".to_string()));
        }

        let entries = self
            .entries
            .lock()
            .map_err(|_| KvError::Unavailable("store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), KvError> {
        if Self::flag(&self.fail_writes) {
            return Err(KvError::Unavailable("writes disabled".to_string()));
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| KvError::Unavailable("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
