//! `reference` and `reference_of` field types.
//!
//! A `reference` field stores the id of another content instance. Its
//! inverse, `reference_of`, stores nothing: it names the content type and
//! field that point back and declares what happens to them when the
//! referenced content is permanently deleted.

use crate::common::INVALID_INITIAL_DATA;
use quire_types::{ContentId, FieldSettings, Violations};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub(crate) const REFERENCE_TAG: &str = "reference";
pub(crate) const REFERENCE_ALLOWED: &[&str] = &["domain", "content_type", "required", "description"];
pub(crate) const REFERENCE_REQUIRED: &[&str] = &["content_type"];

pub(crate) const REFERENCE_OF_TAG: &str = "reference_of";
pub(crate) const REFERENCE_OF_ALLOWED: &[&str] = &[
    "domain",
    "content_type",
    "reference_field",
    "onDelete",
    "description",
];
pub(crate) const REFERENCE_OF_REQUIRED: &[&str] = &["content_type", "reference_field"];

pub const INVALID_CONTENT_TYPE: &str = "invalid_content_type";
pub const INVALID_DOMAIN: &str = "invalid_domain";
pub const INVALID_REFERENCE: &str = "invalid_reference";
pub const INVALID_REFERENCE_FIELD: &str = "invalid_reference_field";
pub const INVALID_ON_DELETE: &str = "invalid_on_delete";
pub const READ_ONLY: &str = "read_only";

/// What happens to referencing content when its target is permanently
/// deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OnDelete {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[default]
    #[serde(rename = "SET NULL")]
    SetNull,
}

impl OnDelete {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            _ => None,
        }
    }

    /// Policy declared by `reference_of` settings. Anything other than
    /// `CASCADE` nullifies.
    pub fn from_settings(settings: &FieldSettings) -> Self {
        settings
            .get_str("onDelete")
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_target(settings: &FieldSettings, violations: &mut Violations) {
    if !settings.get("content_type").is_some_and(Value::is_string) {
        violations.add(INVALID_CONTENT_TYPE, "content_type");
    }
    if settings.get("domain").is_some_and(|d| !d.is_string()) {
        violations.add(INVALID_DOMAIN, "domain");
    }
}

pub(crate) fn validate_reference_settings(settings: &FieldSettings) -> Violations {
    let mut violations = Violations::new();
    check_target(settings, &mut violations);
    violations
}

/// References never carry a default.
pub(crate) fn validate_reference_default(_settings: &FieldSettings, _value: &Value) -> Violations {
    let mut violations = Violations::new();
    violations.add(INVALID_INITIAL_DATA, "");
    violations
}

pub(crate) fn validate_reference_data(_settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    if value.is_null() {
        return violations;
    }
    if ContentId::from_reference(value).is_none() {
        violations.add(INVALID_REFERENCE, "");
    }
    violations
}

pub(crate) fn validate_reference_of_settings(settings: &FieldSettings) -> Violations {
    let mut violations = Violations::new();
    check_target(settings, &mut violations);
    if !settings
        .get_str("reference_field")
        .is_some_and(|f| !f.is_empty())
    {
        violations.add(INVALID_REFERENCE_FIELD, "reference_field");
    }
    if let Some(on_delete) = settings.get("onDelete") {
        if !on_delete.as_str().is_some_and(|s| OnDelete::parse(s).is_some()) {
            violations.add(INVALID_ON_DELETE, "onDelete");
        }
    }
    violations
}

pub(crate) fn validate_reference_of_default(_settings: &FieldSettings, _value: &Value) -> Violations {
    let mut violations = Violations::new();
    violations.add(INVALID_INITIAL_DATA, "");
    violations
}

/// Back-references are computed, never stored.
pub(crate) fn validate_reference_of_data(_settings: &FieldSettings, value: &Value) -> Violations {
    let mut violations = Violations::new();
    if !value.is_null() {
        violations.add(READ_ONLY, "");
    }
    violations
}
