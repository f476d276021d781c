//! JSON-file cache: one envelope file per key under a root directory.
//!
//! Expired entries read as absent and are removed on access.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use catalog_core::traits::RecordCache;
use catalog_core::{Error, Result};

use crate::expiry_for;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    expires_at: Option<DateTime<Utc>>,
    value: serde_json::Value,
}

pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Map a cache key to a file-safe name. Keys in practice are `[A-Za-z0-9_]`.
fn sanitize_key(key: &str) -> String {
    key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '%' }).collect()
}

impl RecordCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope = serde_json::from_str(&raw)
            .map_err(|e| Error::Cache(format!("corrupt cache entry '{}': {}", key, e)))?;
        if envelope.expires_at.is_some_and(|at| at <= Utc::now()) {
            tracing::debug!(key, "cache entry expired");
            self.delete(key)?;
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    fn set(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()> {
        let envelope = Envelope { expires_at: expiry_for(ttl)?, value: value.clone() };
        let path = self.path_for(key);
        // Readers never observe a half-written entry.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&envelope)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
