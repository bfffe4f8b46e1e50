use thiserror::Error;
use tracing::error;

use crate::executor::ExecutorError;

#[derive(Debug, Error)]
pub enum GqlError {
    #[error("Error generating schema: {0}")]
    SchemaError(String),

    #[error("Error resolving request: {0}")]
    ResolverError(String),

    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),
}

pub fn schema_error(msg: impl Into<String>) -> GqlError {
    GqlError::SchemaError(msg.into())
}

pub fn resolver_error(msg: impl Into<String>) -> GqlError {
    GqlError::ResolverError(msg.into())
}

pub fn internal_error(msg: impl Into<String>) -> GqlError {
    let msg = msg.into();
    error!("{}", msg);
    GqlError::InternalError(msg)
}
