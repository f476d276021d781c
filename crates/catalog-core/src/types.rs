//! Domain types shared by the cache, transformer, index clients and synchronizer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A category of game-data entity (e.g. `Item`, `Quest`), mapped 1:1 to one
/// search index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(String);

impl ContentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase name of the index that holds this content type.
    pub fn index_name(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Tagged field value of a cached record.
///
/// Deserialization is untagged so raw JSON blobs load directly; integers that
/// fit in `i64` are kept as `Int`, all other numbers become `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Record),
}

/// Coarse kind of a value, used to detect type-inconsistent documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    List,
    Map,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) | Value::Float(_) => ValueKind::Number,
            Value::Str(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// True for absent-like values: null, empty text and empty composites.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(fields) => fields.is_empty(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
        }
    }

    /// Render a scalar as text. Composites have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A cached record: field name to value. Owned by the cache, read-only here.
pub type Record = BTreeMap<String, Value>;

/// A transformed, index-ready document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Text of a field, or an empty string when absent or composite.
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).and_then(Value::as_text).unwrap_or_default()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Ids the cache currently holds for a content type, in cache order, without
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIdSet {
    ids: Vec<u64>,
}

impl SourceIdSet {
    pub fn new<I: IntoIterator<Item = u64>>(ids: I) -> Self {
        let mut seen = HashSet::new();
        let ids = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }
}

/// Ids already present in the search index for a content type.
pub type IndexedIdSet = BTreeSet<u64>;

/// Refresh behaviour of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshInterval {
    Disabled,
    Every(String),
}

impl RefreshInterval {
    pub fn as_setting(&self) -> &str {
        match self {
            RefreshInterval::Disabled => crate::constants::REFRESH_DISABLED,
            RefreshInterval::Every(interval) => interval,
        }
    }

    pub fn parse(setting: &str) -> Self {
        if setting == crate::constants::REFRESH_DISABLED {
            RefreshInterval::Disabled
        } else {
            RefreshInterval::Every(setting.to_string())
        }
    }
}

/// A partial settings update applied to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPatch {
    pub refresh_interval: RefreshInterval,
}

impl SettingsPatch {
    pub fn refresh(refresh_interval: RefreshInterval) -> Self {
        Self { refresh_interval }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "index": { "refresh_interval": self.refresh_interval.as_setting() }
        })
    }
}

/// Outcome of one document inside a bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub id: u64,
    pub status: u16,
    pub error: Option<String>,
}

impl BulkItem {
    pub fn ok(id: u64) -> Self {
        Self { id, status: 200, error: None }
    }

    pub fn rejected(id: u64, status: u16, error: impl Into<String>) -> Self {
        Self { id, status, error: Some(error.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Per-item results of a bulk call that succeeded as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| !item.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().filter(|item| !item.is_ok())
    }
}

/// What the orchestrator does when a content type fails to submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Halt the whole run on the first submission failure.
    #[default]
    FailFast,
    /// Record the failed content type and continue with the next one.
    Continue,
}
