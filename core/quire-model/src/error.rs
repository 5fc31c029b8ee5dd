//! Error types for the schema model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while looking up or building schemas.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Requested domain, content type, field or collection is absent.
    #[error("{what} not found: {identifier}")]
    NotFound {
        what: &'static str,
        identifier: String,
    },

    /// Identifier already taken within its parent.
    #[error("duplicate {what} identifier: {identifier}")]
    DuplicateIdentifier {
        what: &'static str,
        identifier: String,
    },

    /// A content type still owns content and cannot be deleted.
    #[error("content type '{identifier}' still has {count} content instance(s)")]
    SchemaNotEmpty { identifier: String, count: usize },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn not_found(what: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            identifier: identifier.into(),
        }
    }

    pub(crate) fn duplicate(what: &'static str, identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            what,
            identifier: identifier.into(),
        }
    }
}
