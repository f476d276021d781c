//! catalog-sync
//!
//! Reconciles the record cache against the search index, one content type at
//! a time: id-set diffing, record-to-document transformation, bounded bulk
//! batches, and refresh/rebuild bracketing of each index.
pub mod batch;
pub mod coerce;
pub mod observer;
pub mod report;
pub mod rules;
pub mod settings;
pub mod synchronizer;
pub mod transform;

pub use batch::{BatchBuffer, FlushedBatch};
pub use observer::{NoopObserver, SyncObserver};
pub use report::{ContentOutcome, ContentReport, SyncReport};
pub use settings::IndexSettingsController;
pub use synchronizer::{IndexSynchronizer, SyncMode, SyncOptions};
pub use transform::DocumentTransformer;
