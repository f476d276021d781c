//! Index creation body (settings + mappings).

use serde_json::json;
use std::path::Path;

use crate::{Error, Result};

/// Body sent when an index is created.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMapping {
    body: serde_json::Value,
}

impl IndexMapping {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Mapping used for game-data catalogs: every string field is full-text
    /// searchable with a keyword sub-field for exact matching and sorting.
    pub fn game_data(doc_type: &str) -> Self {
        let mapping = json!({
            "dynamic_templates": [
                {
                    "strings": {
                        "match_mapping_type": "string",
                        "mapping": {
                            "type": "text",
                            "analyzer": "custom_analyzer",
                            "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
                        }
                    }
                }
            ]
        });
        let mappings = if doc_type.is_empty() {
            mapping
        } else {
            let mut typed = serde_json::Map::new();
            typed.insert(doc_type.to_string(), mapping);
            serde_json::Value::Object(typed)
        };
        Self::new(json!({
            "settings": {
                "index": {
                    "number_of_shards": 1,
                    "number_of_replicas": 0,
                    "max_result_window": 100_000
                },
                "analysis": {
                    "analyzer": {
                        "custom_analyzer": {
                            "tokenizer": "standard",
                            "filter": ["lowercase", "asciifolding"]
                        }
                    }
                }
            },
            "mappings": mappings
        }))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let body: serde_json::Value = serde_json::from_str(&raw)?;
        if !body.is_object() {
            return Err(Error::InvalidConfig(format!("mapping file {} must hold a JSON object", path.display())));
        }
        Ok(Self::new(body))
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}
