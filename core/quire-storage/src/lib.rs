//! Content storage for Quire.
//!
//! [`MemoryContentStore`] is an arena of content instances keyed by domain
//! and [`ContentId`](quire_types::ContentId). References between instances
//! are stored as ids, never as pointers, so reference cycles cost nothing.
//!
//! # Architecture
//!
//! - One store per content kind (generic content, users)
//! - Inserts commit immediately; deletes and updates are staged until `flush`
//! - Reads only ever see committed state
//! - Snapshots persist committed content as JSON

mod error;
mod store;

pub use error::{StorageError, StorageResult};
pub use store::MemoryContentStore;
