//! MySQL DDL generation for schemagen documents

use thiserror::Error;

mod column;
mod compiler;
pub mod escape;

pub use column::default_literal;
pub use compiler::SqlCompiler;

/// Generator failures. These signal an IR that bypassed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    #[error("Field {object_type}.{field} of type {type_name} has no column type")]
    UnsupportedScalar {
        object_type: String,
        field: String,
        type_name: String,
    },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Relation field {object_type}.{field} was not resolved")]
    UnresolvedRelation { object_type: String, field: String },

    #[error("Object type {object_type} is referenced but has no primary key")]
    MissingPrimaryKey { object_type: String },
}
