//! Dynamic schema representation
//!
//! Schema objects are either generated from a driver's flag set (sub-schemas)
//! or mutated in place to embed a sub-schema (parent schemas). The wire form
//! is camelCase JSON matching the persisted store layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a schema object in the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Type carried by a resource field
///
/// Primitive types have fixed spellings; everything else is read as a
/// reference to another schema by name, which is how a parent schema embeds
/// a driver's sub-schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Boolean,
    Int,
    /// List of strings (wire form `array[string]`)
    StringList,
    /// Reference to another schema, embedding it under the field
    Reference(SchemaId),
}

impl FieldType {
    /// Parse from the wire spelling. Total: unknown spellings are references.
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "int" => Self::Int,
            "array[string]" => Self::StringList,
            other => Self::Reference(SchemaId::new(other)),
        }
    }

    /// The wire spelling of this type
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::StringList => "array[string]",
            Self::Reference(id) => id.as_str(),
        }
    }

    /// Schema referenced by this type, if any
    pub fn reference(&self) -> Option<&SchemaId> {
        match self {
            Self::Reference(id) => Some(id),
            _ => None,
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor of a single resource field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub create: bool,
    pub update: bool,
    pub nullable: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Owner linkage from a generated schema back to its driver
///
/// Mapped onto the store's native owner-reference mechanism so removal of
/// the driver cascades at the store level as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
}

/// A persisted schema object
///
/// Sub-schemas carry `resource_fields` derived from a driver's flags; parent
/// schemas additionally carry `embed` and `embed_type` naming the logical
/// resource type they augment. Field names are unique per schema (map keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSchema {
    pub name: SchemaId,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_fields: BTreeMap<String, Field>,

    #[serde(default)]
    pub embed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_type: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,

    /// Optimistic-concurrency token, managed by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl DynamicSchema {
    /// Create an empty schema with the given name
    pub fn new(name: impl Into<SchemaId>) -> Self {
        Self {
            name: name.into(),
            resource_fields: BTreeMap::new(),
            embed: false,
            embed_type: None,
            labels: BTreeMap::new(),
            owner_references: Vec::new(),
            resource_version: None,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.resource_fields.contains_key(name)
    }
}
