//! catalog-elastic
//!
//! Elasticsearch HTTP client implementing `SearchIndex`. Requests are async
//! (reqwest) and driven to completion on an owned Tokio runtime so the
//! synchronizer can stay blocking.
pub mod bulk;
pub mod client;

pub use client::ElasticSearch;
