#![allow(dead_code)]

use serde_json::{json, Value as Json};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use catalog_cache::{CacheCatalogSource, CacheKeys, MemoryCache};
use catalog_core::mapping::IndexMapping;
use catalog_core::traits::SearchIndex;
use catalog_core::types::{BulkItem, BulkResponse, Document, SettingsPatch};
use catalog_core::{Error, Result};

/// Every call a `RecordingIndex` received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(String),
    Create(String),
    Settings(String, String),
    Bulk(String, Vec<u64>),
    Add(String, u64),
}

/// In-memory `SearchIndex` double that records calls and can be told to
/// reject documents or fail bulk calls.
#[derive(Default)]
pub struct RecordingIndex {
    calls: Mutex<Vec<Call>>,
    docs: Mutex<BTreeMap<(String, u64), Document>>,
    /// Rejected in bulk and when submitted alone.
    pub reject: HashSet<u64>,
    /// Rejected in bulk only; accepted when retried alone.
    pub reject_in_bulk: HashSet<u64>,
    /// Bulk calls against these indices fail as a whole.
    pub fail_bulk_for: HashSet<String>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bulk_batches(&self) -> Vec<Vec<u64>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Bulk(_, ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn document(&self, index: &str, id: u64) -> Option<Document> {
        self.docs.lock().unwrap().get(&(index.to_string(), id)).cloned()
    }

    pub fn stored_ids(&self, index: &str) -> Vec<u64> {
        self.docs.lock().unwrap().keys().filter(|(name, _)| name == index).map(|(_, id)| *id).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SearchIndex for RecordingIndex {
    fn delete_index(&self, name: &str) -> Result<()> {
        self.record(Call::Delete(name.to_string()));
        self.docs.lock().unwrap().retain(|(index, _), _| index != name);
        Ok(())
    }

    fn create_index(&self, name: &str, _mapping: &IndexMapping) -> Result<()> {
        self.record(Call::Create(name.to_string()));
        Ok(())
    }

    fn put_settings(&self, name: &str, patch: &SettingsPatch) -> Result<()> {
        self.record(Call::Settings(name.to_string(), patch.refresh_interval.as_setting().to_string()));
        Ok(())
    }

    fn bulk_index(&self, name: &str, _doc_type: &str, docs: &BTreeMap<u64, Document>) -> Result<BulkResponse> {
        self.record(Call::Bulk(name.to_string(), docs.keys().copied().collect()));
        if self.fail_bulk_for.contains(name) {
            return Err(Error::submission(name, "connection reset"));
        }
        let mut items = Vec::new();
        for (id, doc) in docs {
            if self.reject.contains(id) || self.reject_in_bulk.contains(id) {
                items.push(BulkItem::rejected(*id, 400, "mapper_parsing_exception"));
                continue;
            }
            self.docs.lock().unwrap().insert((name.to_string(), *id), doc.clone());
            items.push(BulkItem::ok(*id));
        }
        Ok(BulkResponse { items })
    }

    fn add_document(&self, name: &str, _doc_type: &str, id: u64, doc: &Document) -> Result<()> {
        self.record(Call::Add(name.to_string(), id));
        if self.reject.contains(&id) {
            return Err(Error::rejected(name, id, "mapper_parsing_exception"));
        }
        self.docs.lock().unwrap().insert((name.to_string(), id), doc.clone());
        Ok(())
    }
}

pub type MemorySource = CacheCatalogSource<MemoryCache>;

/// A cache-backed source over `content_types`, seeded with id lists and
/// records.
pub struct Seed {
    cache: MemoryCache,
    keys: CacheKeys,
}

impl Seed {
    pub fn new() -> Self {
        Self { cache: MemoryCache::new(), keys: CacheKeys::default() }
    }

    pub fn ids(self, ct: &str, ids: &[u64]) -> Self {
        self.cache.insert(self.keys.source_ids(&ct.into()), json!(ids)).unwrap();
        self
    }

    pub fn indexed(self, ct: &str, ids: &[u64]) -> Self {
        self.cache.insert(self.keys.indexed_ids(&ct.into()), json!(ids)).unwrap();
        self
    }

    pub fn record(self, ct: &str, id: u64, record: Json) -> Self {
        self.cache.insert(self.keys.record(&ct.into(), id), record).unwrap();
        self
    }

    /// A record whose only interesting field is `Name_en`.
    pub fn named(self, ct: &str, id: u64, name: &str) -> Self {
        self.record(ct, id, json!({ "ID": id, "Name_en": name }))
    }

    pub fn source(self, content_types: &[&str]) -> MemorySource {
        CacheCatalogSource::new(self.cache, self.keys, Duration::from_secs(3600))
            .with_content_types(content_types.iter().copied())
    }
}
