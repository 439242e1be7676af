use thiserror::Error;

/// Error type for sqlbench operations.
#[derive(Debug, Error)]
pub enum SqlBenchError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl SqlBenchError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::QueryError(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::InvalidInput(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SqlBenchError::ValidationError(msg.into())
    }
}
