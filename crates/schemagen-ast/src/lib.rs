//! schemagen AST - SDL parser and syntax tree types

pub mod ast;
mod parser;
mod to_ir;

pub use ast::*;
pub use parser::{parse, ParseError};
