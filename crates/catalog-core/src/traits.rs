use std::collections::BTreeMap;
use std::time::Duration;

use crate::mapping::IndexMapping;
use crate::types::{BulkResponse, ContentType, Document, IndexedIdSet, Record, SettingsPatch, SourceIdSet};
use crate::Result;

/// Key-value record cache. Values are raw JSON blobs.
pub trait RecordCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;
    fn set(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Document search index client.
///
/// `bulk_index` returns `Err` only when the call fails as a whole; documents
/// rejected individually are reported in the returned `BulkResponse`.
pub trait SearchIndex: Send + Sync {
    /// Delete an index. Deleting an index that does not exist is not an error.
    fn delete_index(&self, name: &str) -> Result<()>;
    fn create_index(&self, name: &str, mapping: &IndexMapping) -> Result<()>;
    fn put_settings(&self, name: &str, patch: &SettingsPatch) -> Result<()>;
    fn bulk_index(&self, name: &str, doc_type: &str, docs: &BTreeMap<u64, Document>) -> Result<BulkResponse>;
    fn add_document(&self, name: &str, doc_type: &str, id: u64, doc: &Document) -> Result<()>;
}

/// Read access to cached records and the per-content-type id sets.
pub trait ContentCatalogSource: Send + Sync {
    fn list_content_types(&self) -> Vec<ContentType>;
    /// Empty when the cache holds no id list for the content type.
    fn source_ids(&self, ct: &ContentType) -> Result<SourceIdSet>;
    /// Empty when nothing has been indexed yet.
    fn indexed_ids(&self, ct: &ContentType) -> Result<IndexedIdSet>;
    fn record(&self, ct: &ContentType, id: u64) -> Result<Option<Record>>;
    fn save_indexed_ids(&self, ct: &ContentType, ids: &IndexedIdSet) -> Result<()>;
}
