//! Documents: a caller-assigned key, an object body and an optional schema key.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde_json::Value;

use crate::{
    json::{self, EditableObject, JsonError, Object},
    path::Path,
};

/// A stored unit of content.
///
/// Identity is the key alone: two documents with the same key compare equal
/// even when their content differs. Compare [`Document::content`] to check
/// the bodies.
#[derive(Debug, Clone)]
pub struct Document {
    key: String,
    content: Object,
    schema_key: Option<String>,
}

impl Document {
    pub fn new(key: impl Into<String>, content: Object) -> Self {
        Self {
            key: key.into(),
            content,
            schema_key: None,
        }
    }

    /// Build a document from any JSON value, which must be an object.
    pub fn from_value(key: impl Into<String>, value: Value) -> Result<Self, JsonError> {
        Ok(Self::new(key, json::into_object(value)?))
    }

    /// Attach the key of the schema describing this document.
    pub fn with_schema_key(mut self, schema_key: impl Into<String>) -> Self {
        self.schema_key = Some(schema_key.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn content(&self) -> &Object {
        &self.content
    }

    pub fn schema_key(&self) -> Option<&str> {
        self.schema_key.as_deref()
    }

    pub fn into_content(self) -> Object {
        self.content
    }

    /// Content as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.content.clone())
    }

    /// Look up a nested field. The empty path yields `Ok(None)`.
    pub fn value_at_path(&self, path: &Path) -> Result<Option<&Value>, JsonError> {
        json::field_at_path(&self.content, path)
    }

    /// Start a copy-on-write edit of this document's content.
    pub fn edit(&self) -> EditableObject<'_> {
        EditableObject::new(&self.content)
    }

    /// A new document with `incoming` merged into this content.
    ///
    /// Key and schema key are kept.
    pub fn merged_with(&self, incoming: &Object) -> Result<Document, JsonError> {
        Ok(Document {
            key: self.key.clone(),
            content: json::merge_objects(&self.content, incoming)?,
            schema_key: self.schema_key.clone(),
        })
    }

    /// Same key, new content.
    pub fn with_content(&self, content: Object) -> Document {
        Document {
            key: self.key.clone(),
            content,
            schema_key: self.schema_key.clone(),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.key, Value::Object(self.content.clone()))
    }
}
