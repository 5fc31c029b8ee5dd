use crate::error::{StorageError, StorageResult};
use indexmap::IndexMap;
use quire_fields::ContentLookup;
use quire_model::ContentInstance;
use quire_types::{ContentId, ContentKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// A write waiting for the next [`MemoryContentStore::flush`].
#[derive(Debug, Clone, PartialEq)]
enum PendingOp {
    Delete(ContentId),
    Update(ContentInstance),
}

#[derive(Debug, Clone, Default)]
struct DomainContent {
    committed: IndexMap<ContentId, ContentInstance>,
    pending: Vec<PendingOp>,
}

/// On-disk shape: committed instances per domain, in insertion order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    kind: ContentKind,
    domains: BTreeMap<String, Vec<ContentInstance>>,
}

/// Arena of content instances of one kind, keyed by domain and id.
///
/// Instances refer to each other by id only. Deletes and updates are
/// staged and become visible to readers on `flush`; inserts are immediate.
#[derive(Debug, Clone)]
pub struct MemoryContentStore {
    kind: ContentKind,
    domains: HashMap<String, DomainContent>,
}

impl MemoryContentStore {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            domains: HashMap::new(),
        }
    }

    /// Store for generic content.
    pub fn for_content() -> Self {
        Self::new(ContentKind::Content)
    }

    /// Store for user records.
    pub fn for_users() -> Self {
        Self::new(ContentKind::User)
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    fn check_kind(&self, content: &ContentInstance) -> StorageResult<()> {
        if content.kind != self.kind {
            return Err(StorageError::KindMismatch {
                expected: self.kind,
                actual: content.kind,
            });
        }
        Ok(())
    }

    fn committed(&self, domain: &str) -> impl Iterator<Item = &ContentInstance> {
        self.domains
            .get(domain)
            .into_iter()
            .flat_map(|d| d.committed.values())
    }

    fn not_found(domain: &str, id: ContentId) -> StorageError {
        StorageError::NotFound {
            domain: domain.to_string(),
            id,
        }
    }

    /// Adds a new instance, committed immediately.
    pub fn insert(&mut self, domain: &str, content: ContentInstance) -> StorageResult<()> {
        self.check_kind(&content)?;
        let entry = self.domains.entry(domain.to_string()).or_default();
        if entry.committed.contains_key(&content.id) {
            return Err(StorageError::Duplicate(content.id));
        }
        debug!(domain, content_id = %content.id, content_type = %content.content_type, "Inserted content");
        entry.committed.insert(content.id, content);
        Ok(())
    }

    /// Committed instance with `id`.
    pub fn get(&self, domain: &str, id: ContentId) -> Option<&ContentInstance> {
        self.domains.get(domain)?.committed.get(&id)
    }

    pub fn contains(&self, domain: &str, id: ContentId) -> bool {
        self.get(domain, id).is_some()
    }

    /// Committed instances of `content_type`, in insertion order.
    pub fn all_of_type<'a>(
        &'a self,
        domain: &str,
        content_type: &'a str,
    ) -> impl Iterator<Item = &'a ContentInstance> {
        self.committed(domain)
            .filter(move |c| c.content_type.eq_ignore_ascii_case(content_type))
    }

    pub fn count_of_type(&self, domain: &str, content_type: &str) -> usize {
        self.all_of_type(domain, content_type).count()
    }

    /// Total committed instances across all domains.
    pub fn len(&self) -> usize {
        self.domains.values().map(|d| d.committed.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stages removal of a committed instance.
    pub fn permanent_delete(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()> {
        self.check_kind(content)?;
        let entry = self
            .domains
            .get_mut(domain)
            .filter(|d| d.committed.contains_key(&content.id))
            .ok_or_else(|| Self::not_found(domain, content.id))?;
        entry.pending.push(PendingOp::Delete(content.id));
        Ok(())
    }

    /// Stages replacement of a committed instance by `content`.
    pub fn update(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()> {
        self.check_kind(content)?;
        let entry = self
            .domains
            .get_mut(domain)
            .filter(|d| d.committed.contains_key(&content.id))
            .ok_or_else(|| Self::not_found(domain, content.id))?;
        entry.pending.push(PendingOp::Update(content.clone()));
        Ok(())
    }

    pub fn has_pending(&self, domain: &str) -> bool {
        self.domains.get(domain).is_some_and(|d| !d.pending.is_empty())
    }

    /// Applies staged writes of `domain` in the order they were staged.
    /// Returns the number applied.
    pub fn flush(&mut self, domain: &str) -> StorageResult<usize> {
        let Some(entry) = self.domains.get_mut(domain) else {
            return Ok(0);
        };
        let pending = std::mem::take(&mut entry.pending);
        let applied = pending.len();
        for op in pending {
            match op {
                PendingOp::Delete(id) => {
                    entry.committed.shift_remove(&id);
                }
                PendingOp::Update(content) => {
                    if let Some(slot) = entry.committed.get_mut(&content.id) {
                        *slot = content;
                    }
                }
            }
        }
        if applied > 0 {
            debug!(domain, applied, kind = %self.kind, "Flushed staged writes");
        }
        Ok(applied)
    }

    /// Writes committed content to `path` as JSON. Staged writes are not
    /// included.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let snapshot = Snapshot {
            kind: self.kind,
            domains: self
                .domains
                .iter()
                .map(|(name, d)| (name.clone(), d.committed.values().cloned().collect()))
                .collect(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        info!(path = %path.display(), count = self.len(), "Saved content snapshot");
        Ok(())
    }

    /// Reads a store written by [`save`](Self::save).
    pub fn load(path: &Path) -> StorageResult<Self> {
        let snapshot: Snapshot = serde_json::from_slice(&std::fs::read(path)?)?;
        let mut store = Self::new(snapshot.kind);
        for (domain, items) in snapshot.domains {
            for content in items {
                store.insert(&domain, content)?;
            }
        }
        info!(path = %path.display(), count = store.len(), "Loaded content snapshot");
        Ok(store)
    }
}

impl ContentLookup for MemoryContentStore {
    fn get(&self, domain: &str, id: ContentId) -> Option<ContentInstance> {
        MemoryContentStore::get(self, domain, id).cloned()
    }

    fn referencing(
        &self,
        domain: &str,
        content_type: &str,
        reference_field: &str,
        target: ContentId,
    ) -> Vec<ContentInstance> {
        let target = target.to_string();
        self.all_of_type(domain, content_type)
            .filter(|c| {
                c.field_data(reference_field)
                    .and_then(|v| v.as_str())
                    .is_some_and(|id| id == target)
            })
            .cloned()
            .collect()
    }
}
