//! Error types for the cascade engine.

use quire_fields::FieldError;
use quire_storage::StorageError;
use quire_types::ContentId;
use thiserror::Error;

/// Result type for cascade operations.
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Errors that abort a permanent delete.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// A declared reference points at a schema or field that does not exist.
    #[error("integrity failure on '{subject}': {reason}")]
    Integrity { subject: String, reason: String },

    /// Field type error other than an integrity failure.
    #[error("field error: {0}")]
    Field(FieldError),

    /// Persisting a delete or an update failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The reference graph is deeper than the configured limit.
    #[error("cascade depth {max_depth} exceeded at content {content_id}")]
    DepthExceeded {
        max_depth: usize,
        content_id: ContentId,
    },

    /// An observer vetoed or failed to handle a notification.
    #[error(transparent)]
    Observer(#[from] ObserverError),
}

impl From<FieldError> for CascadeError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Integrity { field, reason } => Self::Integrity {
                subject: field,
                reason,
            },
            other => Self::Field(other),
        }
    }
}

/// Raised by a [`ContentObserver`](crate::ContentObserver).
#[derive(Debug, Error)]
#[error("observer error: {0}")]
pub struct ObserverError(pub String);

/// Raised by an [`AuditLog`](crate::AuditLog). Never aborts a cascade.
#[derive(Debug, Error)]
#[error("audit log error: {0}")]
pub struct AuditError(pub String);
