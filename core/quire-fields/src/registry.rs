//! The closed set of field types and the tag registry mapping to them.

use crate::common::check_keys;
use crate::error::{FieldError, FieldResult};
use crate::resolve::{self, ResolveContext, ResolvedContent};
use crate::{checkbox, range, reference, state, text};
use quire_model::{ContentInstance, FieldDefinition};
use quire_types::{FieldSettings, Violations};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A field type. Each variant owns its settings contract, value checks and,
/// for reference-like types, resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Checkbox,
    Range,
    State,
    Reference,
    ReferenceOf,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        Self::Text,
        Self::Checkbox,
        Self::Range,
        Self::State,
        Self::Reference,
        Self::ReferenceOf,
    ];

    /// The canonical type tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text => text::TAG,
            Self::Checkbox => checkbox::TAG,
            Self::Range => range::TAG,
            Self::State => state::TAG,
            Self::Reference => reference::REFERENCE_TAG,
            Self::ReferenceOf => reference::REFERENCE_OF_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn allowed_settings(&self) -> &'static [&'static str] {
        match self {
            Self::Text => text::ALLOWED,
            Self::Checkbox => checkbox::ALLOWED,
            Self::Range => range::ALLOWED,
            Self::State => state::ALLOWED,
            Self::Reference => reference::REFERENCE_ALLOWED,
            Self::ReferenceOf => reference::REFERENCE_OF_ALLOWED,
        }
    }

    pub fn required_settings(&self) -> &'static [&'static str] {
        match self {
            Self::State => state::REQUIRED,
            Self::Reference => reference::REFERENCE_REQUIRED,
            Self::ReferenceOf => reference::REFERENCE_OF_REQUIRED,
            Self::Text | Self::Checkbox | Self::Range => &[],
        }
    }

    /// Whether values are computed rather than stored.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::ReferenceOf)
    }

    /// Allowed/required keys first; type-specific rules only once those
    /// pass.
    pub fn validate_settings(&self, settings: &FieldSettings) -> Violations {
        let base = check_keys(settings, self.allowed_settings(), self.required_settings());
        if !base.is_empty() {
            return base;
        }
        match self {
            Self::Text => text::validate_settings(settings),
            Self::Checkbox => checkbox::validate_settings(settings),
            Self::Range => range::validate_settings(settings),
            Self::State => state::validate_settings(settings),
            Self::Reference => reference::validate_reference_settings(settings),
            Self::ReferenceOf => reference::validate_reference_of_settings(settings),
        }
    }

    pub fn validate_default_value(&self, settings: &FieldSettings, value: &Value) -> Violations {
        match self {
            Self::Text => text::validate_default_value(settings, value),
            Self::Checkbox => checkbox::validate_default_value(settings, value),
            Self::Range => range::validate_default_value(settings, value),
            Self::State => state::validate_default_value(settings, value),
            Self::Reference => reference::validate_reference_default(settings, value),
            Self::ReferenceOf => reference::validate_reference_of_default(settings, value),
        }
    }

    /// Checks a value stored in content data.
    pub fn validate_data(&self, settings: &FieldSettings, value: &Value) -> Violations {
        match self {
            Self::Text => text::validate_data(settings, value),
            Self::Checkbox => checkbox::validate_data(settings, value),
            Self::Range => range::validate_data(settings, value),
            Self::State => state::validate_data(settings, value),
            Self::Reference => reference::validate_reference_data(settings, value),
            Self::ReferenceOf => reference::validate_reference_of_data(settings, value),
        }
    }

    /// Follows a reference-like field. `None` for every other type.
    pub fn resolve_field(
        &self,
        ctx: &ResolveContext<'_>,
        content: &ContentInstance,
        field: &FieldDefinition,
        stored: Option<&Value>,
    ) -> FieldResult<Option<ResolvedContent>> {
        match self {
            Self::Reference => resolve::resolve_reference(ctx, field, stored).map(Some),
            Self::ReferenceOf => resolve::resolve_reference_of(ctx, content, field).map(Some),
            Self::Text | Self::Checkbox | Self::Range | Self::State => Ok(None),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Maps type tags to field kinds. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct FieldTypeRegistry {
    kinds: HashMap<String, FieldKind>,
}

impl FieldTypeRegistry {
    /// An empty registry; nothing resolves until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in kind under its canonical tag.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in FieldKind::ALL {
            registry.register(kind.tag(), kind);
        }
        registry
    }

    /// Registers `kind` under `tag`. Used for aliases of built-in kinds.
    pub fn register(&mut self, tag: impl Into<String>, kind: FieldKind) -> Option<FieldKind> {
        self.kinds.insert(tag.into(), kind)
    }

    pub fn get(&self, tag: &str) -> FieldResult<FieldKind> {
        self.kinds
            .get(tag)
            .copied()
            .ok_or_else(|| FieldError::UnknownFieldType {
                tag: tag.to_string(),
            })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Kind of a field definition.
    pub fn kind_of(&self, field: &FieldDefinition) -> FieldResult<FieldKind> {
        self.get(&field.field_type)
    }

    /// Resolves a field of `content` through its kind.
    pub fn resolve_field(
        &self,
        ctx: &ResolveContext<'_>,
        content: &ContentInstance,
        field: &FieldDefinition,
    ) -> FieldResult<Option<ResolvedContent>> {
        let kind = self.kind_of(field)?;
        let ctx = ctx.with_fields(self);
        kind.resolve_field(&ctx, content, field, content.field_data(field.identifier()))
    }
}
