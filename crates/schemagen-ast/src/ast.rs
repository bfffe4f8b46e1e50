//! AST types for schema documents
//!
//! Minimal syntax tree covering what lowering needs: object and enum
//! definitions, field type shapes and directive arguments.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Definition {
    Object(ObjectDefinition),
    Enum(EnumDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Object(o) => &o.name,
            Definition::Enum(e) => &e.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: TypeRef,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

/// A type reference reduced to what the IR cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub name: String,
    pub required: bool,
    pub list: bool,
}

impl TypeRef {
    /// Unwrap list/non-null wrappers down to the named type.
    ///
    /// `required` describes the outermost wrapper; `list` is set when a list
    /// wrapper appears anywhere.
    pub fn shape(&self) -> TypeShape {
        let required = matches!(self, TypeRef::NonNull(_));
        let mut list = false;
        let mut current = self;
        loop {
            match current {
                TypeRef::Named(name) => {
                    return TypeShape {
                        name: name.clone(),
                        required,
                        list,
                    }
                }
                TypeRef::List(inner) => {
                    list = true;
                    current = &**inner;
                }
                TypeRef::NonNull(inner) => current = &**inner,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

/// Literal directive argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}
