//! Derived input types: `WhereInput`, `WhereUniqueInput`, `OrderByInput`

use async_graphql::dynamic::{Enum, InputObject, InputValue, Type, TypeRef};
use heck::ToUpperCamelCase;
use schemagen_ir::{Document, Field, ObjectType, ScalarType};
use std::collections::HashSet;

use crate::error::{schema_error, GqlError};
use crate::filter::Operator;

pub const DATETIME: &str = "DateTime";

pub fn where_input_name(object_type: &ObjectType) -> String {
    format!("{}WhereInput", object_type.name())
}

pub fn where_unique_input_name(object_type: &ObjectType) -> String {
    format!("{}WhereUniqueInput", object_type.name())
}

pub fn order_by_input_name(object_type: &ObjectType) -> String {
    format!("{}OrderByInput", object_type.name())
}

/// GraphQL type name for a scalar.
pub fn scalar_type_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::ID => TypeRef::ID,
        ScalarType::String => TypeRef::STRING,
        ScalarType::Int => TypeRef::INT,
        ScalarType::Float => TypeRef::FLOAT,
        ScalarType::Boolean => TypeRef::BOOLEAN,
        ScalarType::DateTime => DATETIME,
    }
}

/// GraphQL type name for a scalar or enum field.
pub fn value_type_name(field: &Field) -> Option<&str> {
    match field.scalar_type() {
        Some(scalar) => Some(scalar_type_name(scalar)),
        None if field.is_enum() => Some(field.type_name()),
        None => None,
    }
}

/// `{Type}WhereInput`: one input per supported operator of every scalar and
/// enum field, plus `_and`, `_or` and `_not`.
pub fn where_input(object_type: &ObjectType) -> InputObject {
    let name = where_input_name(object_type);
    let mut input = InputObject::new(&name);

    for field in object_type.fields() {
        let Some(type_name) = value_type_name(field) else {
            continue;
        };
        for operator in Operator::for_field(field) {
            let input_name = format!("{}{}", field.name(), operator.suffix());
            let type_ref = if operator.takes_list() {
                TypeRef::named_nn_list(type_name)
            } else {
                TypeRef::named(type_name)
            };
            input = input.field(InputValue::new(input_name, type_ref));
        }
    }

    for combinator in ["_and", "_or", "_not"] {
        input = input.field(InputValue::new(combinator, TypeRef::named_nn_list(&name)));
    }
    input
}

/// `{Type}WhereUniqueInput` and the nested inputs of its multi-field
/// constraints.
pub fn where_unique_input(object_type: &ObjectType) -> Result<Vec<Type>, GqlError> {
    let name = where_unique_input_name(object_type);
    let mut fields: Vec<(String, TypeRef)> = Vec::new();
    let mut nested_types = Vec::new();

    if let Some(pk) = object_type.primary_key() {
        fields.push((pk.name().to_string(), TypeRef::named(TypeRef::ID)));
    }

    for constraint in object_type.unique_constraints() {
        if let [single] = constraint.fields.as_slice() {
            let field = unique_field(object_type, single)?;
            let type_name = value_type_name(field).unwrap_or(TypeRef::STRING);
            fields.push((field.name().to_string(), TypeRef::named(type_name)));
            continue;
        }

        let label = constraint.label();
        if object_type.field(&label).is_some() {
            return Err(schema_error(format!(
                "unique constraint {} on {} collides with a field of the same name",
                label,
                object_type.name()
            )));
        }

        let nested_name = format!(
            "{}{}UniqueInput",
            object_type.name(),
            label.to_upper_camel_case()
        );
        let mut nested = InputObject::new(&nested_name);
        for field_name in &constraint.fields {
            let field = unique_field(object_type, field_name)?;
            let type_name = value_type_name(field).unwrap_or(TypeRef::STRING);
            nested = nested.field(InputValue::new(field.name(), TypeRef::named_nn(type_name)));
        }
        fields.push((label, TypeRef::named(&nested_name)));
        nested_types.push(Type::InputObject(nested));
    }

    let mut seen = HashSet::new();
    let mut input = InputObject::new(&name);
    for (field_name, type_ref) in fields {
        if seen.insert(field_name.clone()) {
            input = input.field(InputValue::new(field_name, type_ref));
        }
    }
    input = input.field(InputValue::new("_or", TypeRef::named_nn_list(&name)));

    let mut types = vec![Type::InputObject(input)];
    types.extend(nested_types);
    Ok(types)
}

/// `{Type}OrderByInput`, or `None` when the type has no scalar fields.
pub fn order_by_input(object_type: &ObjectType) -> Option<Enum> {
    let mut fields = object_type.scalar_fields().peekable();
    fields.peek()?;

    let mut order = Enum::new(order_by_input_name(object_type));
    for field in fields {
        order = order
            .item(format!("{}_ASC", field.name()))
            .item(format!("{}_DESC", field.name()));
    }
    Some(order)
}

/// Whether any field in the document needs the `DateTime` scalar.
pub fn uses_datetime(document: &Document) -> bool {
    document
        .object_types()
        .iter()
        .flat_map(|t| t.scalar_fields())
        .any(|f| f.scalar_type() == Some(ScalarType::DateTime))
}

fn unique_field<'a>(object_type: &'a ObjectType, name: &str) -> Result<&'a Field, GqlError> {
    object_type.field(name).ok_or_else(|| {
        schema_error(format!(
            "unique constraint on {} references unknown field {}",
            object_type.name(),
            name
        ))
    })
}
