//! Diff-based reconciliation of a schema with a replacement definition.
//!
//! Children (fields, collections) are matched by identifier. Unmatched old
//! children are removed, unmatched new ones are added, and matched ones are
//! updated in place so they keep their `DefinitionId` and anything else
//! attached to them outside the replacement payload.

use crate::schema::{Collection, ContentTypeSchema, FieldDefinition};
use indexmap::IndexMap;
use tracing::debug;

/// A schema child that can absorb the settings of its replacement.
trait MergeChild: Clone {
    fn merge_from(&mut self, other: &Self);
}

impl MergeChild for FieldDefinition {
    fn merge_from(&mut self, other: &Self) {
        self.set_from_entity(other);
    }
}

impl MergeChild for Collection {
    fn merge_from(&mut self, other: &Self) {
        self.set_from_entity(other);
    }
}

/// Counts reported by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MergeStats {
    removed: usize,
    added: usize,
    updated: usize,
}

fn reconcile<T: MergeChild>(
    current: &mut IndexMap<String, T>,
    replacement: &IndexMap<String, T>,
) -> MergeStats {
    let mut stats = MergeStats::default();

    // Present before, absent now.
    let stale: Vec<String> = current
        .keys()
        .filter(|k| !replacement.contains_key(*k))
        .cloned()
        .collect();
    for key in &stale {
        current.shift_remove(key);
    }
    stats.removed = stale.len();

    // Rebuild in the replacement's order, reusing matched children.
    let mut merged = IndexMap::with_capacity(replacement.len());
    for (key, incoming) in replacement {
        match current.shift_remove(key) {
            Some(mut existing) => {
                existing.merge_from(incoming);
                stats.updated += 1;
                merged.insert(key.clone(), existing);
            }
            None => {
                stats.added += 1;
                merged.insert(key.clone(), incoming.clone());
            }
        }
    }
    *current = merged;
    stats
}

impl FieldDefinition {
    /// Takes over title, type and settings of `other`; id and identifier stay.
    pub fn set_from_entity(&mut self, other: &FieldDefinition) -> &mut Self {
        self.title = other.title.clone();
        self.field_type = other.field_type.clone();
        self.settings = other.settings.clone();
        self
    }
}

impl Collection {
    /// Takes over title, type and settings of `other`; id and identifier stay.
    pub fn set_from_entity(&mut self, other: &Collection) -> &mut Self {
        self.title = other.title.clone();
        self.collection_type = other.collection_type.clone();
        self.settings = other.settings.clone();
        self
    }
}

impl ContentTypeSchema {
    /// Replaces this schema's definition with `other` without recreating
    /// unchanged children.
    pub fn set_from_entity(&mut self, other: &ContentTypeSchema) -> &mut Self {
        self.title = other.title.clone();
        self.identifier = other.identifier.clone();
        self.weight = other.weight;
        self.icon = other.icon.clone();
        self.description = other.description.clone();
        self.locales = other.locales.clone();
        self.kind = other.kind;
        self.set_permissions(&other.permissions);

        let fields = reconcile(&mut self.fields, &other.fields);
        self.renumber_fields();

        let collections = reconcile(&mut self.collections, &other.collections);
        self.ensure_default_collection();

        debug!(
            content_type = %self.identifier,
            fields_added = fields.added,
            fields_removed = fields.removed,
            fields_updated = fields.updated,
            collections_added = collections.added,
            collections_removed = collections.removed,
            collections_updated = collections.updated,
            "Merged content type definition"
        );
        self
    }
}
