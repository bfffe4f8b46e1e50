//! Dynamic GraphQL schema generation

use async_graphql::dynamic::{
    Enum, Field, FieldFuture, FieldValue, InputValue, Object, Scalar, Schema, Type, TypeRef,
};
use async_graphql::Value as GqlValue;
use heck::ToLowerCamelCase;
use schemagen_ir::naming::{pluralize, table_name};
use schemagen_ir::{is_datetime_literal, Document, ObjectType, RelationSet, ScalarType};
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::error::{resolver_error, schema_error, GqlError};
use crate::executor::{QueryExecutor, UnboundExecutor};
use crate::filter::{order_by, unique_filter, where_filter};
use crate::inputs::{
    order_by_input, order_by_input_name, uses_datetime, value_type_name, where_input,
    where_input_name, where_unique_input, where_unique_input_name, DATETIME,
};
use crate::resolvers::{make_column_resolver, make_relation_resolver, RelationBinding};

/// Builds an executable schema whose resolvers call `executor`.
pub struct SchemaGenerator<'a> {
    document: &'a Document,
    relations: &'a RelationSet,
    executor: Arc<dyn QueryExecutor>,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(
        document: &'a Document,
        relations: &'a RelationSet,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            document,
            relations,
            executor,
        }
    }

    pub fn generate(&self) -> Result<Schema, GqlError> {
        if self.document.object_types().is_empty() {
            return Err(schema_error("the document declares no object types"));
        }

        let mut types: Vec<Type> = Vec::new();
        let mut query = Object::new("Query");

        for enum_type in self.document.enum_types() {
            let mut gql_enum = Enum::new(enum_type.name());
            for value in enum_type.values() {
                gql_enum = gql_enum.item(value.as_str());
            }
            types.push(Type::Enum(gql_enum));
        }

        if uses_datetime(self.document) {
            types.push(Type::Scalar(datetime_scalar()));
        }

        for object_type in self.document.object_types() {
            types.push(Type::Object(self.object(object_type)?));
            types.push(Type::InputObject(where_input(object_type)));
            types.extend(where_unique_input(object_type)?);

            let order = order_by_input(object_type);
            let has_order = order.is_some();
            if let Some(order) = order {
                types.push(Type::Enum(order));
            }

            query = query
                .field(self.singular_query(object_type))
                .field(self.plural_query(object_type, has_order));
            debug!(object_type = object_type.name(), "Generated API types");
        }

        let mut schema = Schema::build("Query", None, None).register(query);
        for ty in types {
            trace!("adding type: {ty:?}");
            schema = schema.register(ty);
        }

        let schema = schema
            .finish()
            .map_err(|e| schema_error(format!("there was an error generating schema: {e:?}")))?;
        info!(
            object_types = self.document.object_types().len(),
            enums = self.document.enum_types().len(),
            "Generated API schema"
        );
        Ok(schema)
    }

    /// Output type for one object type.
    fn object(&self, object_type: &ObjectType) -> Result<Object, GqlError> {
        let mut object = Object::new(object_type.name());

        for field in object_type.fields() {
            if let Some(type_name) = value_type_name(field) {
                let nn = field.is_required() || field.scalar_type() == Some(ScalarType::ID);
                let type_ref = if nn {
                    TypeRef::named_nn(type_name)
                } else {
                    TypeRef::named(type_name)
                };
                object = object.field(Field::new(field.name(), type_ref, make_column_resolver(field)));
                continue;
            }

            let (relation, side) = self
                .relations
                .for_field(object_type.name(), field.name())
                .ok_or_else(|| {
                    schema_error(format!(
                        "{}.{} has no resolved relation",
                        object_type.name(),
                        field.name()
                    ))
                })?;
            let binding = RelationBinding::new(self.document, relation, side)?;
            let type_ref = match (field.is_list(), field.is_required()) {
                (true, _) => TypeRef::named_nn_list_nn(field.type_name()),
                (false, true) => TypeRef::named_nn(field.type_name()),
                (false, false) => TypeRef::named(field.type_name()),
            };
            object = object.field(Field::new(
                field.name(),
                type_ref,
                make_relation_resolver(binding, self.executor.clone()),
            ));
        }

        Ok(object)
    }

    /// `lowerCamel(Type)(where: TypeWhereUniqueInput!): Type`
    fn singular_query(&self, object_type: &ObjectType) -> Field {
        let table = table_name(object_type.name());
        let shape = object_type.clone();
        let executor = self.executor.clone();

        Field::new(
            object_type.name().to_lower_camel_case(),
            TypeRef::named(object_type.name()),
            move |ctx| {
                let table = table.clone();
                let shape = shape.clone();
                let executor = executor.clone();
                FieldFuture::new(async move {
                    let args = ctx.args.as_index_map();
                    trace!("received request with args: {args:?}");

                    let value = args
                        .get("where")
                        .ok_or_else(|| resolver_error("missing where argument"))?;
                    let filter = unique_filter(value, &shape)?;
                    trace!("parsed filter: {filter:?}");

                    let found = executor
                        .find_first(&table, &filter)
                        .await
                        .map_err(GqlError::from)?;
                    Ok(found.map(FieldValue::owned_any))
                })
            },
        )
        .argument(InputValue::new(
            "where",
            TypeRef::named_nn(where_unique_input_name(object_type)),
        ))
    }

    /// `lowerCamel(plural(Type))(where: TypeWhereInput, orderBy: [TypeOrderByInput!]): [Type!]!`
    fn plural_query(&self, object_type: &ObjectType, has_order: bool) -> Field {
        let table = table_name(object_type.name());
        let shape = object_type.clone();
        let executor = self.executor.clone();

        let mut field = Field::new(
            pluralize(object_type.name()).to_lower_camel_case(),
            TypeRef::named_nn_list_nn(object_type.name()),
            move |ctx| {
                let table = table.clone();
                let shape = shape.clone();
                let executor = executor.clone();
                FieldFuture::new(async move {
                    let args = ctx.args.as_index_map();
                    trace!("received request with args: {args:?}");

                    let filter = match args.get("where") {
                        None | Some(GqlValue::Null) => None,
                        Some(value) => Some(where_filter(value, &shape)?),
                    };
                    let order = match args.get("orderBy") {
                        None => Vec::new(),
                        Some(value) => order_by(value)?,
                    };
                    trace!("parsed filter: {filter:?}, orders: {order:?}");

                    let rows = executor
                        .find_many(&table, filter.as_ref(), &order)
                        .await
                        .map_err(GqlError::from)?;
                    Ok(Some(FieldValue::list(rows.into_iter().map(FieldValue::owned_any))))
                })
            },
        )
        .argument(InputValue::new(
            "where",
            TypeRef::named(where_input_name(object_type)),
        ));

        if has_order {
            field = field.argument(InputValue::new(
                "orderBy",
                TypeRef::named_nn_list(order_by_input_name(object_type)),
            ));
        }
        field
    }
}

/// ISO-8601 date-time carried as a string.
fn datetime_scalar() -> Scalar {
    Scalar::new(DATETIME)
        .description("ISO-8601 encoded date-time")
        .validator(|value| match value {
            GqlValue::String(s) => is_datetime_literal(s),
            _ => false,
        })
}

/// SDL of the schema generated for `document`, without a bound executor.
pub fn generate_sdl(document: &Document, relations: &RelationSet) -> Result<String, GqlError> {
    let schema = SchemaGenerator::new(document, relations, Arc::new(UnboundExecutor)).generate()?;
    Ok(schema.sdl())
}

