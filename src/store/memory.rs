use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::app::{MangaplexError, Result};
use crate::store::KeyValueStore;

/// Non-persistent store, for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| MangaplexError::Other(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| MangaplexError::Other(e.to_string()))?
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
