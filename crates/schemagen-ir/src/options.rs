//! Typed options resolved from directives during lowering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length used for `String` columns without a `maxLength` directive.
pub const DEFAULT_MAX_LENGTH: u32 = 255;

/// Literal declared through `@default(value: ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DefaultValue {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    /// Bare enum literal, e.g. `@default(value: ACTIVE)`.
    Enum(String),
}

impl DefaultValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DefaultValue::String(s) | DefaultValue::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::String(s) => write!(f, "{:?}", s),
            DefaultValue::Int(i) => write!(f, "{}", i),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::Boolean(b) => write!(f, "{}", b),
            DefaultValue::Enum(e) => write!(f, "{}", e),
        }
    }
}

/// Per-field options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
}

/// Unique constraint over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<String>,
}

impl UniqueConstraint {
    pub fn new(fields: Vec<String>) -> Self {
        Self { name: None, fields }
    }

    /// Declared name, or the field names joined with `_`.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.fields.join("_"))
    }
}

/// Secondary index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<String>,

    /// Dialect-specific index type (e.g. `FULLTEXT`), passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
}

/// Per-object-type options from `@options(...)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_constraints: Vec<UniqueConstraint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}
