use quire_types::{ContentId, ContentKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transient stage of a permanent delete, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStage {
    Requested,
    Resolving,
    Cascading,
    Nullifying,
    Planned,
    Committed,
}

impl fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Requested => "requested",
            Self::Resolving => "resolving",
            Self::Cascading => "cascading",
            Self::Nullifying => "nullifying",
            Self::Planned => "planned",
            Self::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// One change made on behalf of a root delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CascadeAction {
    /// Referencing content was deleted with its target.
    Deleted {
        content_id: ContentId,
        content_type: String,
        kind: ContentKind,
        because: ContentId,
    },
    /// A reference field was removed from referencing content.
    Nullified {
        content_id: ContentId,
        content_type: String,
        kind: ContentKind,
        field: String,
        because: ContentId,
    },
}

impl CascadeAction {
    pub fn content_id(&self) -> ContentId {
        match self {
            Self::Deleted { content_id, .. } | Self::Nullified { content_id, .. } => *content_id,
        }
    }
}

/// Every change a root delete caused, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub root: ContentId,
    pub actions: Vec<CascadeAction>,
}

impl CascadeReport {
    pub fn new(root: ContentId) -> Self {
        Self {
            root,
            actions: Vec::new(),
        }
    }

    /// Ids of cascaded deletes.
    pub fn deleted(&self) -> Vec<ContentId> {
        self.actions
            .iter()
            .filter(|a| matches!(a, CascadeAction::Deleted { .. }))
            .map(CascadeAction::content_id)
            .collect()
    }

    /// Ids of content that lost a reference.
    pub fn nullified(&self) -> Vec<ContentId> {
        self.actions
            .iter()
            .filter(|a| matches!(a, CascadeAction::Nullified { .. }))
            .map(CascadeAction::content_id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
