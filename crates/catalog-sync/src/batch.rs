use std::collections::BTreeMap;

use catalog_core::traits::SearchIndex;
use catalog_core::types::{BulkResponse, Document};
use catalog_core::Result;

/// Documents accumulated for one bulk call. The buffer never holds more than
/// `capacity` documents; callers flush when `add` reports it full.
#[derive(Debug)]
pub struct BatchBuffer {
    docs: BTreeMap<u64, Document>,
    capacity: usize,
}

/// A submitted batch together with the per-item outcome the index reported.
#[derive(Debug)]
pub struct FlushedBatch {
    pub docs: BTreeMap<u64, Document>,
    pub response: BulkResponse,
}

impl BatchBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { docs: BTreeMap::new(), capacity: capacity.max(1) }
    }

    /// Insert a document; returns `true` once the buffer reached capacity.
    /// Re-adding an id replaces its document.
    pub fn add(&mut self, id: u64, doc: Document) -> bool {
        self.docs.insert(id, doc);
        self.is_full()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.docs.len() >= self.capacity
    }

    /// Drain the buffer without submitting it.
    fn take(&mut self) -> BTreeMap<u64, Document> {
        std::mem::take(&mut self.docs)
    }

    /// Submit everything buffered in a single bulk call, then clear. On error
    /// the buffer is cleared all the same; the caller decides whether the run
    /// continues.
    pub fn flush(&mut self, index: &dyn SearchIndex, name: &str, doc_type: &str) -> Result<FlushedBatch> {
        let docs = self.take();
        tracing::debug!(index = name, docs = docs.len(), "bulk submit");
        let response = index.bulk_index(name, doc_type, &docs)?;
        Ok(FlushedBatch { docs, response })
    }
}
