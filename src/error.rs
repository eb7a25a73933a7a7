use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlReactorError {
    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Multiple rows returned for single-row query ({count} rows)")]
    MultipleRows { count: usize },

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Callback failed: {0}")]
    CallbackFailed(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SqlReactorError {
    /// True for the cardinality failure raised by single-row queries.
    #[must_use]
    pub fn is_multiple_rows(&self) -> bool {
        matches!(self, SqlReactorError::MultipleRows { .. })
    }
}
