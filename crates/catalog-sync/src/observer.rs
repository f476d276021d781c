use catalog_core::types::ContentType;

use crate::report::ContentReport;

/// Progress hooks for a running synchronization. All methods default to
/// no-ops.
pub trait SyncObserver {
    /// Called before the first id of a content type; `total` is the number of
    /// candidate ids.
    fn content_started(&self, _ct: &ContentType, _total: usize) {}
    /// One candidate id was processed, whatever its fate.
    fn advanced(&self, _ct: &ContentType) {}
    fn content_finished(&self, _report: &ContentReport) {}
}

pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
