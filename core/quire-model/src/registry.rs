//! Read-only lookup of content types per domain.
//!
//! A registry is built once and then only read. Schema changes produce a
//! new registry (`with_schema`) that replaces the old snapshot wholesale.

use crate::error::{ModelError, ModelResult};
use crate::permissions::default_roles;
use crate::schema::ContentTypeSchema;
use indexmap::IndexMap;
use quire_types::{ContentKind, Violations};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The content types and user types of one domain.
///
/// Identifiers are unique case-insensitively across both kinds, so
/// `get_any_type` is never ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSchemas {
    identifier: String,
    roles: Vec<String>,
    content_types: IndexMap<String, ContentTypeSchema>,
    user_types: IndexMap<String, ContentTypeSchema>,
}

fn key(identifier: &str) -> String {
    identifier.to_ascii_lowercase()
}

impl DomainSchemas {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            roles: default_roles(),
            content_types: IndexMap::new(),
            user_types: IndexMap::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Roles that may appear in permission matrices of this domain.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Registers a schema under the map matching its `kind`.
    pub fn add_type(&mut self, schema: ContentTypeSchema) -> ModelResult<()> {
        let k = key(schema.identifier());
        if self.content_types.contains_key(&k) || self.user_types.contains_key(&k) {
            return Err(ModelError::duplicate("content type", schema.identifier()));
        }
        match schema.kind {
            ContentKind::Content => self.content_types.insert(k, schema),
            ContentKind::User => self.user_types.insert(k, schema),
        };
        Ok(())
    }

    /// Registers a schema, replacing an existing one of the same identifier.
    pub fn replace_type(&mut self, schema: ContentTypeSchema) {
        let k = key(schema.identifier());
        self.content_types.shift_remove(&k);
        self.user_types.shift_remove(&k);
        match schema.kind {
            ContentKind::Content => self.content_types.insert(k, schema),
            ContentKind::User => self.user_types.insert(k, schema),
        };
    }

    pub fn content_types(&self) -> impl Iterator<Item = &ContentTypeSchema> {
        self.content_types.values()
    }

    pub fn user_types(&self) -> impl Iterator<Item = &ContentTypeSchema> {
        self.user_types.values()
    }

    pub fn get_type(&self, identifier: &str) -> ModelResult<&ContentTypeSchema> {
        self.content_types
            .get(&key(identifier))
            .ok_or_else(|| ModelError::not_found("content type", identifier))
    }

    pub fn get_user_type(&self, identifier: &str) -> ModelResult<&ContentTypeSchema> {
        self.user_types
            .get(&key(identifier))
            .ok_or_else(|| ModelError::not_found("user type", identifier))
    }

    /// Content type first, user type second.
    pub fn get_any_type(&self, identifier: &str) -> ModelResult<&ContentTypeSchema> {
        let k = key(identifier);
        self.content_types
            .get(&k)
            .or_else(|| self.user_types.get(&k))
            .ok_or_else(|| ModelError::not_found("content or user type", identifier))
    }

    /// Structural validation of every schema in the domain, paths prefixed
    /// with `content_types.<id>` or `user_types.<id>`.
    pub fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        for schema in self.content_types.values() {
            violations.extend_at(
                &format!("content_types.{}", schema.identifier()),
                schema.validate(&self.roles),
            );
        }
        for schema in self.user_types.values() {
            violations.extend_at(
                &format!("user_types.{}", schema.identifier()),
                schema.validate(&self.roles),
            );
        }
        violations
    }
}

/// Definition file shape of a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDocument {
    pub identifier: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub content_types: Vec<ContentTypeSchema>,
    #[serde(default)]
    pub user_types: Vec<ContentTypeSchema>,
}

impl TryFrom<DomainDocument> for DomainSchemas {
    type Error = ModelError;

    fn try_from(doc: DomainDocument) -> Result<Self, Self::Error> {
        let mut domain = DomainSchemas::new(doc.identifier).with_roles(doc.roles);
        for mut schema in doc.content_types {
            schema.kind = ContentKind::Content;
            domain.add_type(schema)?;
        }
        for mut schema in doc.user_types {
            schema.kind = ContentKind::User;
            domain.add_type(schema)?;
        }
        Ok(domain)
    }
}

/// Process-wide, immutable schema lookup keyed by domain.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    domains: HashMap<String, DomainSchemas>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a domain.
    pub fn with_domain(mut self, domain: DomainSchemas) -> ModelResult<Self> {
        let k = key(domain.identifier());
        if self.domains.contains_key(&k) {
            return Err(ModelError::duplicate("domain", domain.identifier()));
        }
        self.domains.insert(k, domain);
        Ok(self)
    }

    /// Returns a new snapshot in which `schema` replaces (or joins) the
    /// types of `domain`. `self` is left untouched.
    pub fn with_schema(&self, domain: &str, schema: ContentTypeSchema) -> ModelResult<Self> {
        let mut next = self.clone();
        let entry = next
            .domains
            .get_mut(&key(domain))
            .ok_or_else(|| ModelError::not_found("domain", domain))?;
        entry.replace_type(schema);
        Ok(next)
    }

    pub fn domain(&self, identifier: &str) -> ModelResult<&DomainSchemas> {
        self.domains
            .get(&key(identifier))
            .ok_or_else(|| ModelError::not_found("domain", identifier))
    }

    pub fn domains(&self) -> impl Iterator<Item = &DomainSchemas> {
        self.domains.values()
    }

    pub fn get_type(&self, domain: &str, type_name: &str) -> ModelResult<&ContentTypeSchema> {
        self.domain(domain)?.get_type(type_name)
    }

    pub fn get_user_type(&self, domain: &str, type_name: &str) -> ModelResult<&ContentTypeSchema> {
        self.domain(domain)?.get_user_type(type_name)
    }

    pub fn get_any_type(&self, domain: &str, type_name: &str) -> ModelResult<&ContentTypeSchema> {
        self.domain(domain)?.get_any_type(type_name)
    }
}
