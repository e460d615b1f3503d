//! Core data model for entity fixtures.
//!
//! Raw tabular input is classified into a [`FieldSpec`] per field and then
//! resolved into a closed [`FieldValue`] before it ever reaches storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Category of storable object, e.g. "node" or "menu_link_content"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKind(String);

impl EntityKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

impl From<String> for EntityKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

/// Opaque identity assigned by storage when an entity is first saved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (kind, identity) pair pointing at a persisted entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

/// How a field's raw value is interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Stored verbatim
    Plain,
    /// Resolved against the file storage by locator (e.g. `public://photo.jpg`)
    FileReference,
    /// Resolved against the target kind by its label
    EntityReference { target: EntityKind },
}

/// Metadata about one field of an entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn plain() -> Self {
        Self { kind: FieldKind::Plain }
    }

    pub fn file_reference() -> Self {
        Self {
            kind: FieldKind::FileReference,
        }
    }

    pub fn entity_reference(target: impl Into<EntityKind>) -> Self {
        Self {
            kind: FieldKind::EntityReference {
                target: target.into(),
            },
        }
    }
}

/// Structural identifier fields of a kind; never subject to reference resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityKeys {
    pub id: String,
    #[serde(default)]
    pub bundle: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl EntityKeys {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bundle: None,
            label: None,
        }
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether `field` is one of the structural keys
    pub fn contains(&self, field: &str) -> bool {
        self.id == field
            || self.bundle.as_deref() == Some(field)
            || self.label.as_deref() == Some(field)
    }
}

/// A field classified by its definition but not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    Plain(Value),
    FileReference { locator: String },
    EntityReference { target: EntityKind, label: String },
}

/// A resolved field value, ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Plain(Value),
    Reference(EntityRef),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Plain(value) => value.as_str(),
            _ => None,
        }
    }

    /// All entity references held by this value, in order
    pub fn references(&self) -> Vec<&EntityRef> {
        match self {
            FieldValue::Plain(_) => Vec::new(),
            FieldValue::Reference(reference) => vec![reference],
            FieldValue::List(items) => items.iter().flat_map(|item| item.references()).collect(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Plain(Value::String(value.to_string()))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Plain(value)
    }
}

/// Field name to resolved value
pub type Fields = BTreeMap<String, FieldValue>;

/// A storable content object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// `None` until storage saves it
    pub id: Option<EntityId>,
    pub fields: Fields,
}

impl Entity {
    pub fn new(kind: EntityKind, fields: Fields) -> Self {
        Self {
            kind,
            id: None,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Plain string value of a field, if it has one
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    pub fn entity_ref(&self) -> Option<EntityRef> {
        self.id.as_ref().map(|id| EntityRef {
            kind: self.kind.clone(),
            id: id.clone(),
        })
    }

    /// Append a value to a field without dropping what is already there
    pub fn append(&mut self, field: &str, value: FieldValue) {
        let merged = match self.fields.remove(field) {
            None => FieldValue::List(vec![value]),
            Some(FieldValue::List(mut items)) => {
                items.push(value);
                FieldValue::List(items)
            }
            Some(existing) => FieldValue::List(vec![existing, value]),
        };
        self.fields.insert(field.to_string(), merged);
    }
}
