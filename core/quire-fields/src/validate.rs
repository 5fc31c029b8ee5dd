//! Schema and content validation against the field type registry.

use crate::common::REQUIRED;
use crate::error::{FieldError, FieldResult};
use crate::registry::{FieldKind, FieldTypeRegistry};
use crate::workflow::Workflow;
use quire_model::{ContentInstance, ContentTypeSchema, DomainSchemas, FieldDefinition};
use quire_types::Violations;
use serde_json::Value;

pub const INVALID_FIELD_TYPE: &str = "invalid_field_type";
pub const UNKNOWN_FIELD: &str = "unknown_field";

impl FieldTypeRegistry {
    /// Settings of one field definition; paths start at `type` or `settings`.
    pub fn validate_field(&self, field: &FieldDefinition) -> Violations {
        let mut violations = Violations::new();
        match self.kind_of(field) {
            Ok(kind) => violations.extend_at("settings", kind.validate_settings(&field.settings)),
            Err(_) => violations.add(INVALID_FIELD_TYPE, "type"),
        }
        violations
    }

    /// Structural schema checks plus the settings of every field.
    pub fn validate_schema(&self, schema: &ContentTypeSchema, allowed_roles: &[String]) -> Violations {
        let mut violations = schema.validate(allowed_roles);
        for field in schema.fields() {
            violations.extend_at(
                &format!("fields.{}", field.identifier()),
                self.validate_field(field),
            );
        }
        violations
    }

    /// Every schema of a domain, with the same prefixes as
    /// [`DomainSchemas::validate`].
    pub fn validate_domain(&self, domain: &DomainSchemas) -> Violations {
        let mut violations = Violations::new();
        for schema in domain.content_types() {
            violations.extend_at(
                &format!("content_types.{}", schema.identifier()),
                self.validate_schema(schema, domain.roles()),
            );
        }
        for schema in domain.user_types() {
            violations.extend_at(
                &format!("user_types.{}", schema.identifier()),
                self.validate_schema(schema, domain.roles()),
            );
        }
        violations
    }

    /// Data of `content` against `schema`: no undeclared keys, stored values
    /// valid for their field, required fields present.
    pub fn validate_content(&self, schema: &ContentTypeSchema, content: &ContentInstance) -> Violations {
        let mut violations = Violations::new();
        for key in content.data.keys() {
            if !schema.has_field(key) {
                violations.add(UNKNOWN_FIELD, key.as_str());
            }
        }
        for field in schema.fields() {
            let Ok(kind) = self.kind_of(field) else {
                continue;
            };
            let value = content.field_data(field.identifier()).filter(|v| !v.is_null());
            match value {
                Some(value) => violations.extend_at(
                    field.identifier(),
                    kind.validate_data(&field.settings, value),
                ),
                None if is_required(field) && !kind.is_virtual() => {
                    violations.add(REQUIRED, field.identifier());
                }
                None => {}
            }
        }
        violations
    }

    /// Workflow of a `state` field of `schema`.
    pub fn workflow(&self, schema: &ContentTypeSchema, field: &str) -> FieldResult<Workflow> {
        let definition = schema.field(field)?;
        let kind = self.kind_of(definition)?;
        if kind != FieldKind::State {
            return Err(FieldError::WrongFieldType {
                field: field.to_string(),
                expected: FieldKind::State.tag(),
                actual: definition.field_type.clone(),
            });
        }
        Workflow::from_settings(field, &definition.settings)
    }

    /// Checks every state field written by `new` against its previous value
    /// in `old`. `None` means the instance is being created.
    pub fn check_state_writes(
        &self,
        schema: &ContentTypeSchema,
        old: Option<&ContentInstance>,
        new: &ContentInstance,
    ) -> FieldResult<()> {
        for field in schema.fields() {
            if self.kind_of(field).ok() != Some(FieldKind::State) {
                continue;
            }
            let Some(next) = new.get_str(&format!("/{}", field.identifier())) else {
                continue;
            };
            let previous = old.and_then(|o| o.get_str(&format!("/{}", field.identifier())));
            Workflow::from_settings(field.identifier(), &field.settings)?.check_write(previous, next)?;
        }
        Ok(())
    }
}

fn is_required(field: &FieldDefinition) -> bool {
    field
        .settings
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
