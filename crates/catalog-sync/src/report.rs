use serde::Serialize;
use std::collections::BTreeSet;

use catalog_core::types::ContentType;

/// Terminal state of one content type within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContentOutcome {
    /// The cache held no ids; the index was not touched.
    Skipped,
    /// Documents were submitted and the indexed-id set saved.
    Persisted,
    /// A failure stopped this content type; the run continued.
    Aborted { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentReport {
    pub content_type: ContentType,
    pub outcome: ContentOutcome,
    /// Ids the cache listed for this content type.
    pub candidates: usize,
    /// Ids accepted by the index during this run.
    pub submitted: BTreeSet<u64>,
    pub already_indexed: usize,
    pub missing: usize,
    /// Records without a primary-language name.
    pub rejected: usize,
    /// Documents the index refused even when retried alone.
    pub failed: Vec<(u64, String)>,
    pub bulk_calls: usize,
    /// Ids skipped by an id filter.
    pub filtered: usize,
}

impl ContentReport {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            outcome: ContentOutcome::Skipped,
            candidates: 0,
            submitted: BTreeSet::new(),
            already_indexed: 0,
            missing: 0,
            rejected: 0,
            failed: Vec::new(),
            bulk_calls: 0,
            filtered: 0,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, ContentOutcome::Aborted { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub contents: Vec<ContentReport>,
}

impl SyncReport {
    pub fn submitted(&self) -> usize {
        self.contents.iter().map(|c| c.submitted.len()).sum()
    }

    pub fn failed_items(&self) -> usize {
        self.contents.iter().map(|c| c.failed.len()).sum()
    }

    pub fn aborted(&self) -> impl Iterator<Item = &ContentReport> {
        self.contents.iter().filter(|c| c.is_aborted())
    }

    pub fn has_failures(&self) -> bool {
        self.aborted().next().is_some() || self.failed_items() > 0
    }

    pub fn content(&self, ct: &str) -> Option<&ContentReport> {
        self.contents.iter().find(|c| c.content_type.as_str() == ct)
    }
}
