//! SDL parser built on `graphql-parser`

use graphql_parser::schema as gql;
use thiserror::Error;
use tracing::trace;

use crate::ast::*;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] gql::ParseError),

    #[error("Unsupported value in directive @{directive}: {reason}")]
    UnsupportedValue { directive: String, reason: String },
}

/// Parse schema source text into AST
///
/// Object and enum type definitions are kept; every other definition
/// (schema, scalar, interface, union, input, directive, extensions) is
/// skipped.
pub fn parse(source: &str) -> Result<SchemaDocument, ParseError> {
    let document = gql::parse_schema::<String>(source)?;

    let mut definitions = Vec::new();
    for definition in document.definitions {
        match definition {
            gql::Definition::TypeDefinition(gql::TypeDefinition::Object(object)) => {
                definitions.push(Definition::Object(convert_object(object)?));
            }
            gql::Definition::TypeDefinition(gql::TypeDefinition::Enum(enum_type)) => {
                definitions.push(Definition::Enum(EnumDefinition {
                    name: enum_type.name,
                    values: enum_type.values.into_iter().map(|v| v.name).collect(),
                }));
            }
            other => trace!(definition = ?other, "Skipping definition"),
        }
    }

    Ok(SchemaDocument { definitions })
}

fn convert_object(object: gql::ObjectType<'_, String>) -> Result<ObjectDefinition, ParseError> {
    let fields = object
        .fields
        .into_iter()
        .map(|field| {
            Ok(FieldDefinition {
                name: field.name,
                field_type: convert_type(field.field_type),
                directives: convert_directives(field.directives)?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(ObjectDefinition {
        name: object.name,
        fields,
        directives: convert_directives(object.directives)?,
    })
}

fn convert_type(ty: gql::Type<'_, String>) -> TypeRef {
    match ty {
        gql::Type::NamedType(name) => TypeRef::Named(name),
        gql::Type::ListType(inner) => TypeRef::List(Box::new(convert_type(*inner))),
        gql::Type::NonNullType(inner) => TypeRef::NonNull(Box::new(convert_type(*inner))),
    }
}

fn convert_directives(
    directives: Vec<gql::Directive<'_, String>>,
) -> Result<Vec<Directive>, ParseError> {
    directives
        .into_iter()
        .map(|directive| {
            let arguments = directive
                .arguments
                .into_iter()
                .map(|(name, value)| {
                    Ok(Argument {
                        name,
                        value: convert_value(&directive.name, value)?,
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?;

            Ok(Directive {
                name: directive.name,
                arguments,
            })
        })
        .collect()
}

fn convert_value(directive: &str, value: gql::Value<'_, String>) -> Result<Value, ParseError> {
    let unsupported = |reason: String| ParseError::UnsupportedValue {
        directive: directive.to_string(),
        reason,
    };

    Ok(match value {
        gql::Value::Null => Value::Null,
        gql::Value::Boolean(b) => Value::Boolean(b),
        gql::Value::Int(n) => Value::Int(
            n.as_i64()
                .ok_or_else(|| unsupported("integer out of range".to_string()))?,
        ),
        gql::Value::Float(f) => Value::Float(f),
        gql::Value::String(s) => Value::String(s),
        gql::Value::Enum(e) => Value::Enum(e),
        gql::Value::Variable(name) => {
            return Err(unsupported(format!("variable ${} in a schema document", name)))
        }
        gql::Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| convert_value(directive, item))
                .collect::<Result<_, _>>()?,
        ),
        gql::Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| Ok((key, convert_value(directive, item)?)))
                .collect::<Result<_, ParseError>>()?,
        ),
    })
}
