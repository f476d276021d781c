use std::time::Duration;

use catalog_core::constants::CONTENT_TYPES;
use catalog_core::traits::{ContentCatalogSource, RecordCache};
use catalog_core::types::{ContentType, IndexedIdSet, Record, SourceIdSet};
use catalog_core::{Error, Result};

/// Cache key layout shared with the game-data importer that fills the cache.
#[derive(Debug, Clone)]
pub struct CacheKeys {
    record_prefix: String,
}

impl CacheKeys {
    pub fn new(record_prefix: impl Into<String>) -> Self {
        Self { record_prefix: record_prefix.into() }
    }

    pub fn source_ids(&self, ct: &ContentType) -> String {
        format!("ids_{}", ct)
    }

    pub fn indexed_ids(&self, ct: &ContentType) -> String {
        format!("ids_{}_es", ct)
    }

    pub fn record(&self, ct: &ContentType, id: u64) -> String {
        format!("{}_{}_{}", self.record_prefix, ct, id)
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self::new("xiv")
    }
}

/// `ContentCatalogSource` over a `RecordCache`. Reads never write; the only
/// mutation is `save_indexed_ids`.
pub struct CacheCatalogSource<C> {
    cache: C,
    keys: CacheKeys,
    content_types: Vec<ContentType>,
    ttl: Duration,
}

impl<C: RecordCache> CacheCatalogSource<C> {
    pub fn new(cache: C, keys: CacheKeys, ttl: Duration) -> Self {
        let content_types = CONTENT_TYPES.iter().map(|name| ContentType::new(*name)).collect();
        Self { cache, keys, content_types, ttl }
    }

    pub fn with_content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ContentType>,
    {
        self.content_types = content_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    fn load_ids(&self, key: &str) -> Result<Vec<u64>> {
        match self.cache.get(key)? {
            Some(value) => Ok(parse_ids(key, &value)),
            None => Ok(Vec::new()),
        }
    }
}

/// Id lists are written as JSON arrays of numbers, but older writers stored
/// numeric strings or index-keyed objects; all three are accepted.
fn parse_ids(key: &str, value: &serde_json::Value) -> Vec<u64> {
    let items: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(map) => map.values().collect(),
        serde_json::Value::Null => return Vec::new(),
        other => {
            tracing::warn!(key, kind = ?other, "id list is not a list, treating as empty");
            return Vec::new();
        }
    };
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let parsed = match item {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        match parsed {
            Some(id) => ids.push(id),
            None => tracing::warn!(key, entry = %item, "ignoring malformed id"),
        }
    }
    ids
}

impl<C: RecordCache> ContentCatalogSource for CacheCatalogSource<C> {
    fn list_content_types(&self) -> Vec<ContentType> {
        self.content_types.clone()
    }

    fn source_ids(&self, ct: &ContentType) -> Result<SourceIdSet> {
        Ok(SourceIdSet::new(self.load_ids(&self.keys.source_ids(ct))?))
    }

    fn indexed_ids(&self, ct: &ContentType) -> Result<IndexedIdSet> {
        Ok(self.load_ids(&self.keys.indexed_ids(ct))?.into_iter().collect())
    }

    fn record(&self, ct: &ContentType, id: u64) -> Result<Option<Record>> {
        let key = self.keys.record(ct, id);
        match self.cache.get(&key)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value @ serde_json::Value::Object(_)) => Ok(Some(serde_json::from_value(value)?)),
            Some(_) => Err(Error::Cache(format!("record '{}' is not an object", key))),
        }
    }

    fn save_indexed_ids(&self, ct: &ContentType, ids: &IndexedIdSet) -> Result<()> {
        let value = serde_json::Value::from(ids.iter().copied().collect::<Vec<u64>>());
        self.cache.set(&self.keys.indexed_ids(ct), &value, self.ttl)
    }
}
