//! Object types, fields and enums

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::options::{
    DefaultValue, FieldOptions, Index, ObjectTypeOptions, UniqueConstraint, DEFAULT_MAX_LENGTH,
};

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    ID,
    String,
    Int,
    Float,
    Boolean,
    DateTime,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(ScalarType::ID),
            "String" => Some(ScalarType::String),
            "Int" => Some(ScalarType::Int),
            "Float" => Some(ScalarType::Float),
            "Boolean" => Some(ScalarType::Boolean),
            "DateTime" => Some(ScalarType::DateTime),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::ID => "ID",
            ScalarType::String => "String",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Boolean => "Boolean",
            ScalarType::DateTime => "DateTime",
        }
    }

    /// Whether values of this type support `<`, `<=`, `>`, `>=`.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ScalarType::Boolean)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "scalar")]
pub enum FieldKind {
    Scalar(ScalarType),
    Enum,
    Relation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    /// Name of the object type declaring this field.
    owner: String,
    type_name: String,
    kind: FieldKind,
    required: bool,
    list: bool,
    #[serde(default)]
    options: FieldOptions,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            owner: String::new(),
            type_name: type_name.into(),
            kind,
            required: false,
            list: false,
            options: FieldOptions::default(),
        }
    }

    /// Shorthand for a field of a built-in scalar type.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, scalar.name(), FieldKind::Scalar(scalar))
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_relation_name(mut self, name: impl Into<String>) -> Self {
        self.options.relation_name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_list(&self) -> bool {
        self.list
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar(_))
    }

    pub fn is_enum(&self) -> bool {
        self.kind == FieldKind::Enum
    }

    pub fn is_relation(&self) -> bool {
        self.kind == FieldKind::Relation
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.kind {
            FieldKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn has_default_value(&self) -> bool {
        self.options.default_value.is_some()
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.options.default_value.as_ref()
    }

    pub fn has_max_length(&self) -> bool {
        self.options.max_length.is_some()
    }

    /// Declared max length, or [`DEFAULT_MAX_LENGTH`].
    pub fn max_length(&self) -> u32 {
        self.options.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }

    pub fn has_relation_name(&self) -> bool {
        self.options.relation_name.is_some()
    }

    pub fn relation_name(&self) -> Option<&str> {
        self.options.relation_name.as_deref()
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    name: String,
    fields: Vec<Field>,
    #[serde(default)]
    options: ObjectTypeOptions,
}

impl ObjectType {
    /// Create an object type; each field's owner is set to `name`.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let name = name.into();
        let fields = fields
            .into_iter()
            .map(|mut field| {
                field.owner = name.clone();
                field
            })
            .collect();

        Self {
            name,
            fields,
            options: ObjectTypeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ObjectTypeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn scalar_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_scalar())
    }

    pub fn enum_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_enum())
    }

    pub fn relation_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_relation())
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.options.unique_constraints
    }

    pub fn indexes(&self) -> &[Index] {
        &self.options.indexes
    }

    /// First field of type `ID`.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.scalar_type() == Some(ScalarType::ID))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
