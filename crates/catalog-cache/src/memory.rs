use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use catalog_core::traits::RecordCache;
use catalog_core::{Error, Result};

use crate::expiry_for;

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local cache, used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key without expiry.
    pub fn insert(&self, key: impl Into<String>, value: serde_json::Value) -> Result<()> {
        self.lock()?.insert(key.into(), Entry { value, expires_at: None });
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries.lock().map_err(|_| Error::Cache("memory cache lock poisoned".into()))
    }
}

impl RecordCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut entries = self.lock()?;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.expires_at.is_some_and(|at| at <= Utc::now()),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()> {
        self.lock()?.insert(key.to_string(), Entry { value: value.clone(), expires_at: expiry_for(ttl)? });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
