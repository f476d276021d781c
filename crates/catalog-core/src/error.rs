use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Index error: {0}")]
    Index(String),

    /// A bulk or single-document write failed as a whole (network or server).
    #[error("Submission to index '{index}' failed: {message}")]
    Submission { index: String, message: String },

    /// The index refused one document (e.g. a field type conflicting with the
    /// index mapping). The index itself is healthy.
    #[error("Index '{index}' rejected document {id}: {reason}")]
    Rejected { index: String, id: u64, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn submission(index: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Submission { index: index.into(), message: message.to_string() }
    }

    pub fn rejected(index: impl Into<String>, id: u64, reason: impl Into<String>) -> Self {
        Self::Rejected { index: index.into(), id, reason: reason.into() }
    }

    pub fn is_submission(&self) -> bool {
        matches!(self, Self::Submission { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
