//! Filter and ordering descriptors, and their translation from GraphQL input
//! values.

use async_graphql::Value as GqlValue;
use schemagen_ir::{Field, ObjectType, ScalarType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{resolver_error, GqlError};

/// Comparison applied to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    StartsWith,
    EndsWith,
    Contains,
}

const ORDERED: &[Operator] = &[Operator::Lt, Operator::Lte, Operator::Gt, Operator::Gte];
const TEXT: &[Operator] = &[Operator::StartsWith, Operator::EndsWith, Operator::Contains];

impl Operator {
    /// Input field suffix, empty for equality.
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "",
            Operator::Lt => "_lt",
            Operator::Lte => "_lte",
            Operator::Gt => "_gt",
            Operator::Gte => "_gte",
            Operator::In => "_in",
            Operator::StartsWith => "_starts_with",
            Operator::EndsWith => "_ends_with",
            Operator::Contains => "_contains",
        }
    }

    /// Whether the operand is a list of values.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In)
    }

    /// Operators a field supports in `WhereInput`, in input field order.
    pub fn for_field(field: &Field) -> Vec<Operator> {
        let mut operators = vec![Operator::Eq];
        match field.scalar_type() {
            Some(scalar) => {
                if scalar.is_ordered() {
                    operators.extend_from_slice(ORDERED);
                }
                operators.push(Operator::In);
                if scalar == ScalarType::String {
                    operators.extend_from_slice(TEXT);
                }
            }
            None if field.is_enum() => operators.push(Operator::In),
            None => return Vec::new(),
        }
        operators
    }
}

/// Row predicate passed to the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    Condition {
        column: String,
        operator: Operator,
        value: JsonValue,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Negated conjunction.
    Not(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: JsonValue) -> Self {
        Filter::Condition {
            column: column.into(),
            operator: Operator::Eq,
            value,
        }
    }

    pub fn is_in(column: impl Into<String>, values: Vec<JsonValue>) -> Self {
        Filter::Condition {
            column: column.into(),
            operator: Operator::In,
            value: JsonValue::Array(values),
        }
    }

    fn all(mut clauses: Vec<Filter>) -> Self {
        if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Filter::And(clauses)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Translate a `{Type}WhereInput` value.
pub fn where_filter(value: &GqlValue, object_type: &ObjectType) -> Result<Filter, GqlError> {
    let GqlValue::Object(entries) = value else {
        return Err(resolver_error("where input must be an object"));
    };

    let mut clauses = Vec::with_capacity(entries.len());
    for (key, value) in entries.iter().filter(|(_, v)| **v != GqlValue::Null) {
        let clause = match key.as_str() {
            "_and" => Filter::And(nested(value, object_type, where_filter)?),
            "_or" => Filter::Or(nested(value, object_type, where_filter)?),
            "_not" => Filter::Not(nested(value, object_type, where_filter)?),
            key => {
                let (field, operator) = parse_filter_key(key, object_type)
                    .ok_or_else(|| resolver_error(format!("unknown filter field {}", key)))?;
                Filter::Condition {
                    column: field.name().to_string(),
                    operator,
                    value: to_json(value)?,
                }
            }
        };
        clauses.push(clause);
    }

    Ok(Filter::all(clauses))
}

/// Translate a `{Type}WhereUniqueInput` value.
pub fn unique_filter(value: &GqlValue, object_type: &ObjectType) -> Result<Filter, GqlError> {
    let GqlValue::Object(entries) = value else {
        return Err(resolver_error("where input must be an object"));
    };
    let mut clauses = Vec::with_capacity(entries.len());
    for (key, value) in entries.iter().filter(|(_, v)| **v != GqlValue::Null) {
        let key = key.as_str();
        if key == "_or" {
            clauses.push(Filter::Or(nested(value, object_type, unique_filter)?));
        } else if object_type.field(key).is_some() {
            clauses.push(Filter::eq(key, to_json(value)?));
        } else if let Some(constraint) = object_type
            .unique_constraints()
            .iter()
            .find(|c| c.fields.len() > 1 && c.label() == key)
        {
            let GqlValue::Object(parts) = value else {
                return Err(resolver_error(format!("{} must be an object", key)));
            };
            let mut conditions = Vec::with_capacity(constraint.fields.len());
            for name in &constraint.fields {
                let part = parts
                    .get(name.as_str())
                    .ok_or_else(|| resolver_error(format!("{}.{} is required", key, name)))?;
                conditions.push(Filter::eq(name.clone(), to_json(part)?));
            }
            clauses.push(Filter::And(conditions));
        } else {
            return Err(resolver_error(format!("unknown unique field {}", key)));
        }
    }

    if clauses.is_empty() {
        return Err(resolver_error(format!(
            "a unique lookup on {} needs at least one field",
            object_type.name()
        )));
    }
    Ok(Filter::all(clauses))
}

/// Translate an `orderBy` argument (`[{Type}OrderByInput!]`).
pub fn order_by(value: &GqlValue) -> Result<Vec<OrderBy>, GqlError> {
    let items = match value {
        GqlValue::Null => return Ok(Vec::new()),
        GqlValue::List(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };

    items
        .iter()
        .map(|item| {
            let name = match item {
                GqlValue::Enum(name) => name.as_str(),
                GqlValue::String(name) => name.as_str(),
                other => return Err(resolver_error(format!("invalid order value {}", other))),
            };
            if let Some(column) = name.strip_suffix("_ASC") {
                Ok(OrderBy {
                    column: column.to_string(),
                    direction: Direction::Asc,
                })
            } else if let Some(column) = name.strip_suffix("_DESC") {
                Ok(OrderBy {
                    column: column.to_string(),
                    direction: Direction::Desc,
                })
            } else {
                Err(resolver_error(format!("invalid order value {}", name)))
            }
        })
        .collect()
}

/// Split a `WhereInput` key into its field and operator.
///
/// An exact field name wins; otherwise the longest matching suffix is tried
/// first, so `name_lte` is never read as field `name_lt` + `e`.
fn parse_filter_key<'a>(key: &str, object_type: &'a ObjectType) -> Option<(&'a Field, Operator)> {
    let filterable = |name: &str| {
        object_type
            .field(name)
            .filter(|f| f.is_scalar() || f.is_enum())
    };

    if let Some(field) = filterable(key) {
        return Some((field, Operator::Eq));
    }

    let mut suffixed = [
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
    ];
    suffixed.sort_by_key(|op| std::cmp::Reverse(op.suffix().len()));

    suffixed.into_iter().find_map(|operator| {
        let base = key.strip_suffix(operator.suffix())?;
        let field = filterable(base)?;
        Operator::for_field(field)
            .contains(&operator)
            .then_some((field, operator))
    })
}

fn nested(
    value: &GqlValue,
    object_type: &ObjectType,
    translate: fn(&GqlValue, &ObjectType) -> Result<Filter, GqlError>,
) -> Result<Vec<Filter>, GqlError> {
    match value {
        GqlValue::List(items) => items.iter().map(|item| translate(item, object_type)).collect(),
        GqlValue::Object(_) => Ok(vec![translate(value, object_type)?]),
        other => Err(resolver_error(format!("expected a list of objects, found {}", other))),
    }
}

fn to_json(value: &GqlValue) -> Result<JsonValue, GqlError> {
    value
        .clone()
        .into_json()
        .map_err(|e| resolver_error(format!("cannot convert {}: {}", value, e)))
}
