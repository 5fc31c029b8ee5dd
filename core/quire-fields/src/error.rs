//! Error types for field types.

use quire_model::ModelError;
use quire_types::Violations;
use thiserror::Error;

/// Result type for field type operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised by field types at runtime.
///
/// Settings and value problems are *not* errors: they are reported as
/// [`Violations`]. These variants cover lookups that cannot proceed.
#[derive(Debug, Error)]
pub enum FieldError {
    /// No field type is registered under this tag.
    #[error("unknown field type: {tag}")]
    UnknownFieldType { tag: String },

    /// A field was used as a different type than it is declared.
    #[error("field '{field}' is of type '{actual}', expected '{expected}'")]
    WrongFieldType {
        field: String,
        expected: &'static str,
        actual: String,
    },

    /// Settings failed validation; the workflow cannot be built.
    #[error("invalid settings for field '{field}': {violations}")]
    InvalidSettings { field: String, violations: Violations },

    /// The transition's `from` set does not contain the current place.
    #[error("transition '{transition}' is not allowed from place '{place}'")]
    TransitionNotAllowed { transition: String, place: String },

    /// A direct write of a state field that no single transition explains.
    #[error("state change from '{from}' to '{to}' is not allowed")]
    StateChangeNotAllowed { from: String, to: String },

    /// The workflow has no transition of that name.
    #[error("unknown transition: {transition}")]
    UnknownTransition { transition: String },

    /// The workflow has no place of that name.
    #[error("unknown place: {place}")]
    UnknownPlace { place: String },

    /// A declared reference points at a schema or field that does not exist.
    #[error("integrity failure on field '{field}': {reason}")]
    Integrity { field: String, reason: String },

    /// Schema lookup failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
