//! Turning stored references into content instances.
//!
//! Stores are reached through [`ContentLookup`]; the context picks the
//! content or user store by the kind of the target schema, so reference
//! fields may point at either without knowing which.

use crate::error::{FieldError, FieldResult};
use crate::registry::{FieldKind, FieldTypeRegistry};
use quire_model::{ContentInstance, ContentTypeSchema, FieldDefinition, SchemaRegistry};
use quire_types::{ContentId, ContentKind};
use serde_json::Value;
use tracing::debug;

/// Read side of a content store.
pub trait ContentLookup {
    /// The instance with `id` in `domain`, if it exists.
    fn get(&self, domain: &str, id: ContentId) -> Option<ContentInstance>;

    /// Every instance of `content_type` whose `reference_field` holds
    /// `target`, in store order.
    fn referencing(
        &self,
        domain: &str,
        content_type: &str,
        reference_field: &str,
        target: ContentId,
    ) -> Vec<ContentInstance>;
}

/// Everything a reference needs to be followed.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub domain: &'a str,
    pub schemas: &'a SchemaRegistry,
    content: &'a dyn ContentLookup,
    users: &'a dyn ContentLookup,
    fields: Option<&'a FieldTypeRegistry>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        domain: &'a str,
        schemas: &'a SchemaRegistry,
        content: &'a dyn ContentLookup,
        users: &'a dyn ContentLookup,
    ) -> Self {
        Self {
            domain,
            schemas,
            content,
            users,
            fields: None,
        }
    }

    /// Uses `fields` to read the type tags of the fields being followed.
    #[must_use]
    pub fn with_fields(mut self, fields: &'a FieldTypeRegistry) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Kind of `field`, through the registry when one is attached.
    fn kind_of(&self, field: &FieldDefinition) -> Option<FieldKind> {
        match self.fields {
            Some(fields) => fields.kind_of(field).ok(),
            None => FieldKind::from_tag(&field.field_type),
        }
    }

    /// Store holding instances of `kind`.
    pub fn lookup(&self, kind: ContentKind) -> &'a dyn ContentLookup {
        match kind {
            ContentKind::Content => self.content,
            ContentKind::User => self.users,
        }
    }
}

/// Instances a reference-like field resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    pub domain: String,
    pub kind: ContentKind,
    pub content_type: String,
    pub items: Vec<ContentInstance>,
}

fn integrity(field: &FieldDefinition, reason: impl Into<String>) -> FieldError {
    FieldError::Integrity {
        field: field.identifier().to_string(),
        reason: reason.into(),
    }
}

/// Domain and schema named by the field's `domain`/`content_type` settings.
fn target_schema<'a>(
    ctx: &ResolveContext<'a>,
    field: &FieldDefinition,
) -> FieldResult<(String, &'a ContentTypeSchema)> {
    let domain = field
        .settings
        .get_str("domain")
        .unwrap_or(ctx.domain)
        .to_string();
    let content_type = field
        .settings
        .get_str("content_type")
        .ok_or_else(|| integrity(field, "no content_type configured"))?;
    let schema = ctx
        .schemas
        .get_any_type(&domain, content_type)
        .map_err(|e| integrity(field, e.to_string()))?;
    Ok((domain, schema))
}

pub(crate) fn resolve_reference(
    ctx: &ResolveContext<'_>,
    field: &FieldDefinition,
    stored: Option<&Value>,
) -> FieldResult<ResolvedContent> {
    let (domain, schema) = target_schema(ctx, field)?;
    let mut items = Vec::new();
    match stored {
        None | Some(Value::Null) => {}
        Some(value) => {
            let id = ContentId::from_reference(value)
                .ok_or_else(|| integrity(field, format!("malformed reference {value}")))?;
            items.extend(ctx.lookup(schema.kind).get(&domain, id));
        }
    }
    Ok(ResolvedContent {
        domain,
        kind: schema.kind,
        content_type: schema.identifier().to_string(),
        items,
    })
}

pub(crate) fn resolve_reference_of(
    ctx: &ResolveContext<'_>,
    content: &ContentInstance,
    field: &FieldDefinition,
) -> FieldResult<ResolvedContent> {
    let (domain, schema) = target_schema(ctx, field)?;
    let reference_field = field
        .settings
        .get_str("reference_field")
        .ok_or_else(|| integrity(field, "no reference_field configured"))?;
    let target = schema
        .field(reference_field)
        .map_err(|e| integrity(field, e.to_string()))?;
    if ctx.kind_of(target) != Some(FieldKind::Reference) {
        return Err(integrity(
            field,
            format!(
                "'{}.{}' is of type '{}', not a reference",
                schema.identifier(),
                reference_field,
                target.field_type
            ),
        ));
    }

    let items = ctx.lookup(schema.kind).referencing(
        &domain,
        schema.identifier(),
        reference_field,
        content.id,
    );
    debug!(
        content_id = %content.id,
        field = field.identifier(),
        referencing_type = schema.identifier(),
        count = items.len(),
        "Resolved back-references"
    );
    Ok(ResolvedContent {
        domain,
        kind: schema.kind,
        content_type: schema.identifier().to_string(),
        items,
    })
}
