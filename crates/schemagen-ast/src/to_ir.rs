//! Convert AST to canonical IR
//!
//! Field types are classified against the declared object and enum names,
//! and directives are resolved into typed options.

use schemagen_ir::{self as ir, IrError};
use std::collections::HashSet;
use tracing::debug;

use crate::ast::*;

impl SchemaDocument {
    /// Lower the syntax tree into a validated IR document.
    pub fn to_ir(&self) -> Result<ir::Document, IrError> {
        let mut object_names = HashSet::new();
        let mut enum_names = HashSet::new();
        for definition in &self.definitions {
            match definition {
                Definition::Object(o) => object_names.insert(o.name.as_str()),
                Definition::Enum(e) => enum_names.insert(e.name.as_str()),
            };
        }

        let scope = Scope {
            object_names,
            enum_names,
        };

        let mut object_types = Vec::new();
        let mut enum_types = Vec::new();
        for definition in &self.definitions {
            match definition {
                Definition::Object(o) => object_types.push(o.to_ir(&scope)?),
                Definition::Enum(e) => enum_types.push(ir::EnumType::new(&e.name, e.values.clone())),
            }
        }

        debug!(
            object_types = object_types.len(),
            enum_types = enum_types.len(),
            "Lowered schema document"
        );
        ir::Document::new(object_types, enum_types)
    }
}

/// Declared type names visible to field classification.
struct Scope<'a> {
    object_names: HashSet<&'a str>,
    enum_names: HashSet<&'a str>,
}

impl Scope<'_> {
    fn classify(&self, type_name: &str) -> Option<ir::FieldKind> {
        if let Some(scalar) = ir::ScalarType::from_name(type_name) {
            Some(ir::FieldKind::Scalar(scalar))
        } else if self.enum_names.contains(type_name) {
            Some(ir::FieldKind::Enum)
        } else if self.object_names.contains(type_name) {
            Some(ir::FieldKind::Relation)
        } else {
            None
        }
    }
}

impl ObjectDefinition {
    fn to_ir(&self, scope: &Scope<'_>) -> Result<ir::ObjectType, IrError> {
        let fields = self
            .fields
            .iter()
            .map(|f| f.to_ir(&self.name, scope))
            .collect::<Result<Vec<_>, _>>()?;

        let mut options = ir::ObjectTypeOptions::default();
        if let Some(directive) = find_directive(&self.directives, "options") {
            let invalid = |reason: String| IrError::InvalidDirective {
                location: self.name.clone(),
                directive: directive.name.clone(),
                reason,
            };

            if let Some(constraints) = directive.argument("constraints") {
                if let Some(unique) = constraints.get("unique") {
                    let entries = unique
                        .as_list()
                        .ok_or_else(|| invalid("constraints.unique must be a list".into()))?;
                    for entry in entries {
                        options.unique_constraints.push(ir::UniqueConstraint {
                            name: optional_name(entry, "name").map_err(&invalid)?,
                            fields: field_list(entry).map_err(&invalid)?,
                        });
                    }
                }
            }

            if let Some(indexes) = directive.argument("indexes") {
                let entries = indexes
                    .as_list()
                    .ok_or_else(|| invalid("indexes must be a list".into()))?;
                for entry in entries {
                    options.indexes.push(ir::Index {
                        name: optional_name(entry, "name").map_err(&invalid)?,
                        fields: field_list(entry).map_err(&invalid)?,
                        index_type: optional_name(entry, "type").map_err(&invalid)?,
                    });
                }
            }
        }

        Ok(ir::ObjectType::new(&self.name, fields).with_options(options))
    }
}

impl FieldDefinition {
    fn to_ir(&self, object_type: &str, scope: &Scope<'_>) -> Result<ir::Field, IrError> {
        let shape = self.field_type.shape();
        let kind = scope
            .classify(&shape.name)
            .ok_or_else(|| IrError::UnknownType {
                object_type: object_type.to_string(),
                field: self.name.clone(),
                type_name: shape.name.clone(),
            })?;

        let location = format!("{}.{}", object_type, self.name);
        let mut options = ir::FieldOptions::default();

        if let Some(directive) = find_directive(&self.directives, "default") {
            let value = directive.argument("value").ok_or_else(|| IrError::InvalidDirective {
                location: location.clone(),
                directive: directive.name.clone(),
                reason: "missing argument value".into(),
            })?;
            options.default_value = Some(default_value(value).ok_or_else(|| {
                IrError::InvalidDefaultValue {
                    object_type: object_type.to_string(),
                    field: self.name.clone(),
                    reason: format!("{} literals cannot be defaults", value.kind()),
                }
            })?);
        }

        if let Some(directive) = find_directive(&self.directives, "maxLength") {
            let length = match directive.argument("value") {
                Some(Value::Int(n)) => u32::try_from(*n).ok().filter(|n| *n > 0),
                _ => None,
            };
            options.max_length = Some(length.ok_or_else(|| IrError::InvalidDirective {
                location: location.clone(),
                directive: directive.name.clone(),
                reason: "value must be a positive integer".into(),
            })?);
        }

        if let Some(directive) = find_directive(&self.directives, "relation") {
            options.relation_name = match directive.argument("name") {
                None => None,
                Some(Value::String(name)) => Some(name.clone()),
                Some(other) => {
                    return Err(IrError::InvalidDirective {
                        location,
                        directive: directive.name.clone(),
                        reason: format!("name must be a string, got {}", other.kind()),
                    })
                }
            };
        }

        Ok(ir::Field::new(&self.name, shape.name, kind)
            .required(shape.required)
            .list(shape.list)
            .with_options(options))
    }
}

fn find_directive<'a>(directives: &'a [Directive], name: &str) -> Option<&'a Directive> {
    directives.iter().find(|d| d.name == name)
}

fn default_value(value: &Value) -> Option<ir::DefaultValue> {
    match value {
        Value::String(s) => Some(ir::DefaultValue::String(s.clone())),
        Value::Int(i) => Some(ir::DefaultValue::Int(*i)),
        Value::Float(f) => Some(ir::DefaultValue::Float(*f)),
        Value::Boolean(b) => Some(ir::DefaultValue::Boolean(*b)),
        Value::Enum(e) => Some(ir::DefaultValue::Enum(e.clone())),
        Value::Null | Value::List(_) | Value::Object(_) => None,
    }
}

/// A string or enum literal under `key`, if present.
fn optional_name(entry: &Value, key: &str) -> Result<Option<String>, String> {
    match entry.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) | Some(Value::Enum(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("{} must be a string, got {}", key, other.kind())),
    }
}

fn field_list(entry: &Value) -> Result<Vec<String>, String> {
    let fields = entry
        .get("fields")
        .and_then(Value::as_list)
        .ok_or_else(|| "fields must be a list of field names".to_string())?;

    fields
        .iter()
        .map(|f| match f {
            Value::String(s) | Value::Enum(s) => Ok(s.clone()),
            other => Err(format!("field names must be strings, got {}", other.kind())),
        })
        .collect()
}
