//! Error types for the storage layer.

use quire_types::{ContentId, ContentKind};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No committed instance with this id.
    #[error("content not found: {id} in domain '{domain}'")]
    NotFound { domain: String, id: ContentId },

    /// An instance with this id is already stored.
    #[error("duplicate content id: {0}")]
    Duplicate(ContentId),

    /// The instance belongs to the other manager.
    #[error("{actual} content cannot be stored in a {expected} store")]
    KindMismatch {
        expected: ContentKind,
        actual: ContentKind,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
