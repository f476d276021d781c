//! NDJSON bulk request encoding and per-item response decoding.
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use catalog_core::types::{BulkItem, BulkResponse, Document};
use catalog_core::{Error, Result};

/// Encode documents as `index` actions. An empty `doc_type` omits `_type`
/// (typeless clusters).
pub fn bulk_body(index: &str, doc_type: &str, docs: &BTreeMap<u64, Document>) -> Result<String> {
    let mut body = String::new();
    for (id, doc) in docs {
        let mut action = serde_json::json!({ "_index": index, "_id": id.to_string() });
        if !doc_type.is_empty() {
            action["_type"] = serde_json::Value::from(doc_type);
        }
        body.push_str(&serde_json::to_string(&serde_json::json!({ "index": action }))?);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
struct RawBulk {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, RawItem>>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "_id")]
    id: String,
    status: u16,
    error: Option<serde_json::Value>,
}

/// Human-readable `type: reason` from an Elasticsearch error object.
pub fn error_reason(error: &serde_json::Value) -> String {
    let kind = error.get("type").and_then(|v| v.as_str());
    let reason = error.get("reason").and_then(|v| v.as_str());
    match (kind, reason) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        (None, Some(reason)) => reason.to_string(),
        (None, None) => error.to_string(),
    }
}

pub fn parse_bulk_response(index: &str, body: &str) -> Result<BulkResponse> {
    let raw: RawBulk = serde_json::from_str(body)?;
    let mut items = Vec::with_capacity(raw.items.len());
    for entry in raw.items {
        for (_action, item) in entry {
            let id = item
                .id
                .parse::<u64>()
                .map_err(|_| Error::Index(format!("bulk response for '{}' has non-numeric id '{}'", index, item.id)))?;
            items.push(BulkItem { id, status: item.status, error: item.error.as_ref().map(error_reason) });
        }
    }
    let response = BulkResponse { items };
    if raw.errors != response.has_failures() {
        tracing::warn!(index, errors = raw.errors, "bulk errors flag disagrees with item statuses");
    }
    Ok(response)
}
