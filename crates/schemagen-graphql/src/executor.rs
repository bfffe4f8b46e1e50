//! The relational query executor resolvers delegate to

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::filter::{Filter, OrderBy};

/// A row keyed by column name.
pub type Row = serde_json::Map<String, JsonValue>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("No query executor is bound to this schema")]
    Unavailable,
}

/// Data access used by generated resolvers.
///
/// Tables and columns are the names emitted by the SQL generator; filters
/// are [`Filter`] trees over those columns.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch the row of `table` whose primary key equals `id`.
    async fn find_by_id(&self, table: &str, id: &JsonValue) -> Result<Option<Row>, ExecutorError>;

    async fn find_many(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: &[OrderBy],
    ) -> Result<Vec<Row>, ExecutorError>;

    async fn find_first(&self, table: &str, filter: &Filter) -> Result<Option<Row>, ExecutorError>;
}

/// Executor for schemas that are only printed, never queried.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundExecutor;

#[async_trait]
impl QueryExecutor for UnboundExecutor {
    async fn find_by_id(&self, _table: &str, _id: &JsonValue) -> Result<Option<Row>, ExecutorError> {
        Err(ExecutorError::Unavailable)
    }

    async fn find_many(
        &self,
        _table: &str,
        _filter: Option<&Filter>,
        _order: &[OrderBy],
    ) -> Result<Vec<Row>, ExecutorError> {
        Err(ExecutorError::Unavailable)
    }

    async fn find_first(&self, _table: &str, _filter: &Filter) -> Result<Option<Row>, ExecutorError> {
        Err(ExecutorError::Unavailable)
    }
}
