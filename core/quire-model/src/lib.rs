//! Content model for Quire.
//!
//! Defines the schema-side types every other Quire crate depends on:
//! - [`ContentInstance`]: one record (id, kind, type, JSON data map)
//! - [`ContentTypeSchema`]: ordered fields, collections, permissions, locales
//! - [`FieldDefinition`] / [`Collection`]: schema children with stable ids
//! - [`SchemaRegistry`]: immutable per-domain lookup of content and user types
//!
//! Field *types* (what settings mean, how values validate) live in
//! `quire-fields`; this crate only stores the tag and the settings bag.

mod content;
mod error;
mod merge;
mod permissions;
mod registry;
mod schema;

pub use content::ContentInstance;
pub use error::{ModelError, ModelResult};
pub use permissions::{
    ContentAction, Permissions, ROLE_ADMINISTRATOR, ROLE_EDITOR, ROLE_PUBLIC, default_roles,
};
pub use registry::{DomainDocument, DomainSchemas, SchemaRegistry};
pub use schema::{
    Collection, ContentTypeDocument, ContentTypeSchema, DEFAULT_COLLECTION,
    DEFAULT_COLLECTION_TYPE, FieldDefinition, is_valid_identifier,
};
