use quire_types::{ContentId, ContentKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of a content type.
///
/// All user data flows through this type. The `data` map holds arbitrary
/// JSON keyed by field identifier; its shape is governed by the schema
/// named in `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentInstance {
    #[serde(default)]
    pub id: ContentId,
    #[serde(default)]
    pub kind: ContentKind,
    pub content_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ContentInstance {
    /// Creates generic content of `content_type` with a fresh id.
    pub fn new(content_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: ContentId::new(),
            kind: ContentKind::Content,
            content_type: content_type.into(),
            data,
        }
    }

    /// Creates a user record of `user_type` with a fresh id.
    pub fn user(user_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: ContentKind::User,
            ..Self::new(user_type, data)
        }
    }

    /// Builds an instance from a JSON object literal; non-objects give empty data.
    pub fn from_json(content_type: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(content_type, data)
    }

    /// Stored value for a field, if any.
    pub fn field_data(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Extract a value from `data` using a JSON pointer (e.g., "/meta/author").
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let mut parts = pointer.strip_prefix('/')?.splitn(2, '/');
        let head = parts.next()?;
        let value = self.data.get(head)?;
        match parts.next() {
            Some(rest) => value.pointer(&format!("/{rest}")),
            None => Some(value),
        }
    }

    /// Extract a string value from `data` using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Sets the stored value of a field, returning the previous one.
    pub fn set_field(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(field.into(), value.into())
    }

    /// Removes a field from the data map, keeping the order of the rest.
    pub fn remove_field(&mut self, field: &str) -> Option<Value> {
        self.data.shift_remove(field)
    }
}
