//! GraphQL API generation
//!
//! Builds an `async-graphql` dynamic schema from the IR: one output type per
//! object type, `WhereInput`/`WhereUniqueInput`/`OrderByInput` inputs, and a
//! root `Query` whose resolvers delegate to a [`QueryExecutor`].

mod error;
pub mod executor;
pub mod filter;
pub mod inputs;
mod resolvers;
mod schema;

pub use error::GqlError;
pub use executor::{ExecutorError, QueryExecutor, Row, UnboundExecutor};
pub use filter::{Direction, Filter, Operator, OrderBy};
pub use resolvers::RelationBinding;
pub use schema::{generate_sdl, SchemaGenerator};
