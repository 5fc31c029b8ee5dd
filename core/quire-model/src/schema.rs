use crate::error::{ModelError, ModelResult};
use crate::permissions::Permissions;
use indexmap::IndexMap;
use quire_types::{ContentKind, DefinitionId, FieldSettings, Violations};
use serde::{Deserialize, Serialize};

/// Identifier of the collection every content type must carry.
pub const DEFAULT_COLLECTION: &str = "all";
/// Collection type tag of the synthesized default collection.
pub const DEFAULT_COLLECTION_TYPE: &str = "table";

const MAX_LEN: usize = 255;

/// Returns true for non-empty `[a-z0-9_]+` strings (case-insensitive).
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(violations: &mut Violations, path: &str, value: &str) {
    if value.trim().is_empty() {
        violations.add("not_blank", path);
    } else if value.len() > MAX_LEN {
        violations.add("too_long", path);
    } else if !is_valid_identifier(value) {
        violations.add("invalid_characters", path);
    }
}

/// Locale tags such as `en`, `de_AT` or `ast`.
fn is_valid_locale(s: &str) -> bool {
    let (lang, region) = match s.split_once('_') {
        Some((l, r)) => (l, Some(r)),
        None => (s, None),
    };
    let lang_ok = (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_lowercase());
    let region_ok = region.is_none_or(|r| r.len() == 2 && r.chars().all(|c| c.is_ascii_uppercase()));
    lang_ok && region_ok
}

/// One typed, named slot of a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    id: DefinitionId,
    identifier: String,
    #[serde(default)]
    pub title: String,
    /// Tag naming the field type variant (e.g. `state`, `reference_of`).
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub settings: FieldSettings,
    #[serde(default)]
    weight: u32,
}

impl FieldDefinition {
    pub fn new(identifier: impl Into<String>, field_type: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            id: DefinitionId::new(),
            title: identifier.clone(),
            identifier,
            field_type: field_type.into(),
            settings: FieldSettings::new(),
            weight: 0,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: FieldSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display position inside the owning schema.
    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// A named view over the content of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    id: DefinitionId,
    identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_collection_type")]
    pub collection_type: String,
    #[serde(default)]
    pub settings: FieldSettings,
}

fn default_collection_type() -> String {
    DEFAULT_COLLECTION_TYPE.to_string()
}

impl Collection {
    pub fn new(identifier: impl Into<String>, collection_type: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            id: DefinitionId::new(),
            title: identifier.clone(),
            identifier,
            collection_type: collection_type.into(),
            settings: FieldSettings::new(),
        }
    }

    /// The `all` table every content type owns.
    pub fn default_collection() -> Self {
        Self::new(DEFAULT_COLLECTION, DEFAULT_COLLECTION_TYPE).with_title("All")
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// The shape of one content type: ordered fields, collections and permissions.
///
/// Serializes through [`ContentTypeDocument`], where fields and collections
/// are plain lists in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContentTypeDocument", into = "ContentTypeDocument")]
pub struct ContentTypeSchema {
    pub(crate) identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub kind: ContentKind,
    pub locales: Vec<String>,
    pub weight: i32,
    pub(crate) fields: IndexMap<String, FieldDefinition>,
    pub(crate) collections: IndexMap<String, Collection>,
    pub(crate) permissions: Permissions,
}

impl ContentTypeSchema {
    /// Creates an empty content type with the default `all` collection and
    /// the default permission matrix.
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        let mut schema = Self {
            identifier: identifier.into(),
            title: title.into(),
            description: None,
            icon: None,
            kind: ContentKind::Content,
            locales: Vec::new(),
            weight: 0,
            fields: IndexMap::new(),
            collections: IndexMap::new(),
            permissions: Permissions::default(),
        };
        schema.ensure_default_collection();
        schema
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    // ── Fields ───────────────────────────────────────────────────

    /// Fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    pub fn field(&self, identifier: &str) -> ModelResult<&FieldDefinition> {
        self.fields
            .get(identifier)
            .ok_or_else(|| ModelError::not_found("field", format!("{}.{identifier}", self.identifier)))
    }

    pub fn has_field(&self, identifier: &str) -> bool {
        self.fields.contains_key(identifier)
    }

    /// Fields whose type tag equals `field_type`, in display order.
    pub fn fields_of_type<'a>(&'a self, field_type: &'a str) -> impl Iterator<Item = &'a FieldDefinition> {
        self.fields.values().filter(move |f| f.field_type == field_type)
    }

    /// Appends a field. Returns false (and changes nothing) when the
    /// identifier is already taken.
    pub fn add_field(&mut self, mut field: FieldDefinition) -> bool {
        if self.fields.contains_key(&field.identifier) {
            return false;
        }
        field.weight = self.fields.len() as u32;
        self.fields.insert(field.identifier.clone(), field);
        true
    }

    /// Removes a field; the remaining weights stay contiguous.
    pub fn remove_field(&mut self, identifier: &str) -> Option<FieldDefinition> {
        let removed = self.fields.shift_remove(identifier);
        self.renumber_fields();
        removed
    }

    /// Replaces all fields. Later duplicates of an identifier are ignored.
    pub fn set_fields(&mut self, fields: impl IntoIterator<Item = FieldDefinition>) {
        self.fields.clear();
        for field in fields {
            self.add_field(field);
        }
    }

    pub(crate) fn renumber_fields(&mut self) {
        for (weight, field) in self.fields.values_mut().enumerate() {
            field.weight = weight as u32;
        }
    }

    // ── Collections ──────────────────────────────────────────────

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn collection(&self, identifier: &str) -> ModelResult<&Collection> {
        self.collections.get(identifier).ok_or_else(|| {
            ModelError::not_found("collection", format!("{}.{identifier}", self.identifier))
        })
    }

    /// Adds a collection unless its identifier is taken.
    pub fn add_collection(&mut self, collection: Collection) -> bool {
        if self.collections.contains_key(&collection.identifier) {
            return false;
        }
        self.collections.insert(collection.identifier.clone(), collection);
        true
    }

    /// Replaces all collections, synthesizing `all` when the new set lacks it.
    pub fn set_collections(&mut self, collections: impl IntoIterator<Item = Collection>) {
        self.collections.clear();
        for collection in collections {
            self.add_collection(collection);
        }
        self.ensure_default_collection();
    }

    pub(crate) fn ensure_default_collection(&mut self) {
        if !self.collections.contains_key(DEFAULT_COLLECTION) {
            self.collections
                .shift_insert(0, DEFAULT_COLLECTION.to_string(), Collection::default_collection());
        }
    }

    // ── Permissions ──────────────────────────────────────────────

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Resets the matrix to its defaults and overlays `permissions`.
    pub fn set_permissions(&mut self, permissions: &Permissions) {
        self.permissions.reset_with(permissions);
    }

    pub fn permissions_mut(&mut self) -> &mut Permissions {
        &mut self.permissions
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Fails when content of this type still exists.
    pub fn ensure_deletable(&self, content_count: usize) -> ModelResult<()> {
        if content_count > 0 {
            return Err(ModelError::SchemaNotEmpty {
                identifier: self.identifier.clone(),
                count: content_count,
            });
        }
        Ok(())
    }

    /// Structural validation of the schema itself. Field settings are
    /// checked by the field type registry, not here.
    pub fn validate(&self, allowed_roles: &[String]) -> Violations {
        let mut violations = Violations::new();

        check_identifier(&mut violations, "identifier", &self.identifier);

        if self.title.trim().is_empty() {
            violations.add("not_blank", "title");
        } else if self.title.len() > MAX_LEN {
            violations.add("too_long", "title");
        }

        if let Some(icon) = &self.icon {
            if icon.len() > MAX_LEN {
                violations.add("too_long", "icon");
            } else if !is_valid_identifier(icon) {
                violations.add("invalid_characters", "icon");
            }
        }

        for (expected, field) in self.fields.values().enumerate() {
            check_identifier(
                &mut violations,
                &format!("fields.{}.identifier", field.identifier),
                &field.identifier,
            );
            if field.weight as usize != expected {
                violations.add("invalid_weight", format!("fields.{}.weight", field.identifier));
            }
        }

        if !self.collections.contains_key(DEFAULT_COLLECTION) {
            violations.add("missing_default_collection", "collections");
        }
        for collection in self.collections.values() {
            check_identifier(
                &mut violations,
                &format!("collections.{}.identifier", collection.identifier),
                &collection.identifier,
            );
        }

        violations.extend(self.permissions.validate(allowed_roles));

        for (i, locale) in self.locales.iter().enumerate() {
            if locale.trim().is_empty() {
                violations.add("not_blank", format!("locales.{i}"));
            } else if !is_valid_locale(locale) {
                violations.add("invalid_locale", format!("locales.{i}"));
            }
        }

        violations
    }
}

/// Persisted/definition shape of a content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeDocument {
    pub identifier: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub weight: i32,
}

impl TryFrom<ContentTypeDocument> for ContentTypeSchema {
    type Error = ModelError;

    fn try_from(doc: ContentTypeDocument) -> Result<Self, Self::Error> {
        let mut schema = ContentTypeSchema::new(doc.identifier, doc.title);
        schema.description = doc.description;
        schema.icon = doc.icon;
        schema.kind = doc.kind;
        schema.locales = doc.locales;
        schema.weight = doc.weight;

        for field in doc.fields {
            let identifier = field.identifier.clone();
            if !schema.add_field(field) {
                return Err(ModelError::duplicate("field", identifier));
            }
        }

        schema.collections.clear();
        for collection in doc.collections {
            let identifier = collection.identifier.clone();
            if !schema.add_collection(collection) {
                return Err(ModelError::duplicate("collection", identifier));
            }
        }
        schema.ensure_default_collection();

        if let Some(permissions) = doc.permissions {
            schema.set_permissions(&permissions);
        }
        Ok(schema)
    }
}

impl From<ContentTypeSchema> for ContentTypeDocument {
    fn from(schema: ContentTypeSchema) -> Self {
        Self {
            identifier: schema.identifier,
            title: schema.title,
            description: schema.description,
            icon: schema.icon,
            kind: schema.kind,
            fields: schema.fields.into_values().collect(),
            collections: schema.collections.into_values().collect(),
            permissions: Some(schema.permissions),
            locales: schema.locales,
            weight: schema.weight,
        }
    }
}
