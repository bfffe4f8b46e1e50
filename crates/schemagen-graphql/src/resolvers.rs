//! Field resolvers for generated object types

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::{Name, Value as GqlValue};
use schemagen_ir::naming::table_name;
use schemagen_ir::{Document, Field, FieldKind, Relation, RelationKind, ScalarType, Side};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::trace;

use crate::error::{internal_error, schema_error, GqlError};
use crate::executor::{QueryExecutor, Row};
use crate::filter::Filter;

/// How a relation field reaches the rows on the other side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationBinding {
    /// The parent row holds the reference column.
    ForeignKey { target_table: String, column: String },
    /// The target rows hold a column referencing the parent's key.
    Reverse {
        target_table: String,
        column: String,
        primary_key: String,
        many: bool,
    },
    /// Rows are paired through a junction table.
    Junction {
        junction: String,
        own_column: String,
        other_column: String,
        primary_key: String,
        target_table: String,
        target_primary_key: String,
    },
}

impl RelationBinding {
    /// Binding for the field on `side` of `relation`.
    pub fn new(document: &Document, relation: &Relation, side: Side) -> Result<Self, GqlError> {
        let own = relation.side(side);
        let other = relation.side(side.opposite());
        let target_table = table_name(&other.object_type);

        if relation.kind_for(side) == RelationKind::ManyToMany {
            return Ok(RelationBinding::Junction {
                junction: relation.junction_table().to_string(),
                own_column: relation.junction_column(side),
                other_column: relation.junction_column(side.opposite()),
                primary_key: primary_key(document, &own.object_type)?,
                target_table,
                target_primary_key: primary_key(document, &other.object_type)?,
            });
        }

        if relation.owns_foreign_key(side) {
            return Ok(RelationBinding::ForeignKey {
                target_table,
                column: relation.foreign_key_column(side),
            });
        }

        Ok(RelationBinding::Reverse {
            target_table,
            column: relation.foreign_key_column(side.opposite()),
            primary_key: primary_key(document, &own.object_type)?,
            many: own.list,
        })
    }
}

fn primary_key(document: &Document, object_type: &str) -> Result<String, GqlError> {
    document
        .object_type(object_type)
        .and_then(|t| t.primary_key())
        .map(|pk| pk.name().to_string())
        .ok_or_else(|| schema_error(format!("{} has no ID field", object_type)))
}

/// Resolver reading the column named after `field` from the parent row.
pub fn make_column_resolver(
    field: &Field,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
    let column = field.name().to_string();
    let kind = field.kind();
    move |ctx: ResolverContext| {
        let column = column.clone();
        FieldFuture::new(async move {
            let row = ctx
                .parent_value
                .downcast_ref::<Row>()
                .ok_or_else(|| internal_error("failed to downcast parent row"))?;

            match row.get(&column) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(value) => Ok(Some(FieldValue::value(column_value(value, &kind)?))),
            }
        })
    }
}

fn column_value(value: &JsonValue, kind: &FieldKind) -> Result<GqlValue, GqlError> {
    match (kind, value) {
        (FieldKind::Enum, JsonValue::String(s)) => Ok(GqlValue::Enum(Name::new(s))),
        (FieldKind::Scalar(ScalarType::ID), JsonValue::Number(n)) => Ok(GqlValue::String(n.to_string())),
        _ => GqlValue::from_json(value.clone())
            .map_err(|e| internal_error(format!("unrepresentable column value: {}", e))),
    }
}

fn parent_key(row: &Row, primary_key: &str) -> Result<JsonValue, GqlError> {
    row.get(primary_key)
        .cloned()
        .ok_or_else(|| internal_error(format!("parent row has no {} column", primary_key)))
}

/// Resolver following `binding` from the parent row through the executor.
pub fn make_relation_resolver(
    binding: RelationBinding,
    executor: Arc<dyn QueryExecutor>,
) -> impl for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static {
    move |ctx: ResolverContext| {
        let binding = binding.clone();
        let executor = executor.clone();
        FieldFuture::new(async move {
            let row = ctx
                .parent_value
                .downcast_ref::<Row>()
                .ok_or_else(|| internal_error("failed to downcast parent row"))?;
            trace!(?binding, "resolving relation field");

            match binding {
                RelationBinding::ForeignKey {
                    target_table,
                    column,
                } => {
                    let id = match row.get(&column) {
                        None | Some(JsonValue::Null) => return Ok(None),
                        Some(id) => id,
                    };
                    let found = executor.find_by_id(&target_table, id).await.map_err(GqlError::from)?;
                    Ok(found.map(FieldValue::owned_any))
                }
                RelationBinding::Reverse {
                    target_table,
                    column,
                    primary_key,
                    many,
                } => {
                    let key = parent_key(row, &primary_key)?;
                    let filter = Filter::eq(column, key);
                    if many {
                        let rows = executor
                            .find_many(&target_table, Some(&filter), &[])
                            .await
                            .map_err(GqlError::from)?;
                        Ok(Some(FieldValue::list(rows.into_iter().map(FieldValue::owned_any))))
                    } else {
                        let found = executor
                            .find_first(&target_table, &filter)
                            .await
                            .map_err(GqlError::from)?;
                        Ok(found.map(FieldValue::owned_any))
                    }
                }
                RelationBinding::Junction {
                    junction,
                    own_column,
                    other_column,
                    primary_key,
                    target_table,
                    target_primary_key,
                } => {
                    let key = parent_key(row, &primary_key)?;
                    let links = executor
                        .find_many(&junction, Some(&Filter::eq(own_column, key)), &[])
                        .await
                        .map_err(GqlError::from)?;
                    let keys: Vec<JsonValue> = links
                        .iter()
                        .filter_map(|link| link.get(&other_column).cloned())
                        .collect();
                    if keys.is_empty() {
                        return Ok(Some(FieldValue::list(Vec::<FieldValue>::new())));
                    }
                    let rows = executor
                        .find_many(&target_table, Some(&Filter::is_in(target_primary_key, keys)), &[])
                        .await
                        .map_err(GqlError::from)?;
                    Ok(Some(FieldValue::list(rows.into_iter().map(FieldValue::owned_any))))
                }
            }
        })
    }
}
