//! Content lifecycle notifications.
//!
//! Every mutation the cascade engine performs is bracketed by a `Before`
//! and an `After` notification. Delivery is synchronous and ordered; the
//! event itself is an immutable descriptor of which instance is affected.

use crate::{ContentId, ContentKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// The instance is removed for good (no soft-delete / trash).
    PermanentDelete,
    /// The instance's data map is replaced.
    Update,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermanentDelete => f.write_str("PERMANENT_DELETE"),
            Self::Update => f.write_str("UPDATE"),
        }
    }
}

/// Whether the notification fires before the mutation or after the flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Before,
    After,
}

/// A notification about one content instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEvent {
    pub kind: EventKind,
    pub phase: EventPhase,
    pub content_id: ContentId,
    pub content_type: String,
    pub content_kind: ContentKind,
}

impl ContentEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(
        kind: EventKind,
        phase: EventPhase,
        content_id: ContentId,
        content_type: impl Into<String>,
        content_kind: ContentKind,
    ) -> Self {
        Self {
            kind,
            phase,
            content_id,
            content_type: content_type.into(),
            content_kind,
        }
    }

    /// Creates a `Before` notification.
    #[must_use]
    pub fn before(
        kind: EventKind,
        content_id: ContentId,
        content_type: impl Into<String>,
        content_kind: ContentKind,
    ) -> Self {
        Self::new(kind, EventPhase::Before, content_id, content_type, content_kind)
    }

    /// Creates an `After` notification.
    #[must_use]
    pub fn after(
        kind: EventKind,
        content_id: ContentId,
        content_type: impl Into<String>,
        content_kind: ContentKind,
    ) -> Self {
        Self::new(kind, EventPhase::After, content_id, content_type, content_kind)
    }
}
