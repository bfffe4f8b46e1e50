use thiserror::Error;

/// Configuration errors found while building the IR or resolving relations.
///
/// Every variant names the object type(s) and field(s) involved so the
/// message can point at the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("Unknown type {type_name} for field {object_type}.{field}")]
    UnknownType {
        object_type: String,
        field: String,
        type_name: String,
    },

    #[error("Type {0} is declared more than once")]
    DuplicateType(String),

    #[error("Field {field} is declared more than once on {object_type}")]
    DuplicateField { object_type: String, field: String },

    #[error("Value {value} is declared more than once in enum {enum_type}")]
    DuplicateEnumValue { enum_type: String, value: String },

    #[error("Missing relation field on {target_type} for {source_type}.{field}")]
    MissingRelationField {
        source_type: String,
        target_type: String,
        field: String,
    },

    #[error(
        "Ambiguous relation for {source_type}.{field}: {target_type} has fields {} targeting {source_type}",
        .candidates.join(", ")
    )]
    AmbiguousRelation {
        source_type: String,
        target_type: String,
        field: String,
        candidates: Vec<String>,
    },

    #[error("Relation name {name} is used by {uses} field(s), expected exactly 2")]
    DuplicateOrAmbiguousRelationName { name: String, uses: usize },

    #[error("Relation name {name} is computed for both {first} and {second}")]
    RelationNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Field {object_type}.{field} pairs with both {first} and {second}")]
    FieldAlreadyPaired {
        object_type: String,
        field: String,
        first: String,
        second: String,
    },

    #[error("Reference column {column} for {object_type}.{field} clashes with {existing}")]
    ForeignKeyColumnCollision {
        object_type: String,
        field: String,
        column: String,
        existing: String,
    },

    #[error("Object type {object_type} has no ID field but is part of a relation")]
    MissingPrimaryKey { object_type: String },

    #[error("Constraint {constraint} on {object_type} references unknown column {field}")]
    UnknownConstraintField {
        object_type: String,
        constraint: String,
        field: String,
    },

    #[error("Invalid @{directive} on {location}: {reason}")]
    InvalidDirective {
        location: String,
        directive: String,
        reason: String,
    },

    #[error("Invalid default value for {object_type}.{field}: {reason}")]
    InvalidDefaultValue {
        object_type: String,
        field: String,
        reason: String,
    },
}
