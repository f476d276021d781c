//! catalog-text
//!
//! A local `SearchIndex` on top of Tantivy, one index directory per content
//! type. Used for the `local` backend and in tests that need a real index.
pub mod index;
pub mod tantivy_utils;

pub use index::TantivySearchIndex;
