//! Persistence seam used by the cascade engine.

use quire_fields::ContentLookup;
use quire_model::ContentInstance;
use quire_storage::{MemoryContentStore, StorageResult};

/// Writes content of one kind. Writes are staged until `flush`.
pub trait ContentManager: ContentLookup {
    fn permanent_delete(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()>;

    /// Replaces the stored data of `content`.
    fn update(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()>;

    fn flush(&mut self, domain: &str) -> StorageResult<()>;
}

impl ContentManager for MemoryContentStore {
    fn permanent_delete(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()> {
        MemoryContentStore::permanent_delete(self, domain, content)
    }

    fn update(&mut self, domain: &str, content: &ContentInstance) -> StorageResult<()> {
        MemoryContentStore::update(self, domain, content)
    }

    fn flush(&mut self, domain: &str) -> StorageResult<()> {
        MemoryContentStore::flush(self, domain).map(|_| ())
    }
}
