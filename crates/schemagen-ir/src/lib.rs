//! schemagen Intermediate Representation (IR)
//!
//! Typed document model lowered from the schema syntax tree, plus the
//! relationship resolver. All types are deterministically serializable so a
//! document can be fingerprinted.

mod document;
mod error;
pub mod naming;
mod options;
mod relation;
mod resolver;
mod types;

pub use document::{is_datetime_literal, Document};
pub use error::IrError;
pub use options::*;
pub use relation::{Cardinality, Relation, RelationKind, RelationSide, Side};
pub use resolver::RelationSet;
pub use types::*;
