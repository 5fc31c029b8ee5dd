//! Core type definitions for Quire.
//!
//! This crate defines the fundamental, schema-agnostic types used throughout
//! the content core:
//! - Content and definition identifiers (UUID v7)
//! - The settings bag attached to field definitions
//! - Validation violations (code + path), accumulated rather than thrown
//! - Content lifecycle notifications (permanent delete, update)
//!
//! Schema-specific types (content types, fields, workflows) belong in
//! `quire-model` and `quire-fields`, not here.

mod event;
mod ids;
mod settings;
mod violation;

pub use event::{ContentEvent, EventKind, EventPhase};
pub use ids::{ContentId, DefinitionId};
pub use settings::{FieldSettings, json_type_name};
pub use violation::{Violation, Violations};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which persistence manager owns a content instance.
///
/// Users are content too (they have a schema and fields), but they are
/// stored and deleted through their own manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    Content,
    User,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => f.write_str("content"),
            Self::User => f.write_str("user"),
        }
    }
}

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {what}: {value:?}")]
    InvalidId { what: &'static str, value: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
