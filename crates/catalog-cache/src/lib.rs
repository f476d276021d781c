//! catalog-cache
//!
//! `RecordCache` backends (in-memory and JSON files on disk) and the
//! cache-backed `ContentCatalogSource` used by the synchronizer.
pub mod file;
pub mod memory;
pub mod source;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use source::{CacheCatalogSource, CacheKeys};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

use catalog_core::{Error, Result};

/// Absolute expiry for a TTL; a zero TTL never expires.
pub(crate) fn expiry_for(ttl: Duration) -> Result<Option<DateTime<Utc>>> {
    if ttl.is_zero() {
        return Ok(None);
    }
    let out_of_range = || Error::InvalidConfig(format!("cache ttl of {}s is out of range", ttl.as_secs()));
    let ttl = ChronoDuration::from_std(ttl).map_err(|_| out_of_range())?;
    Utc::now().checked_add_signed(ttl).map(Some).ok_or_else(out_of_range)
}
