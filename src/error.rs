use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlNamedError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// Named substitution or list expansion failed.
    #[error("Bind error: {0}")]
    BindError(String),

    /// A single-row fetch matched nothing.
    #[error("no rows in result set")]
    NoRows,

    /// A single-row fetch matched more than one row.
    #[error("expected exactly one row, query returned {0}")]
    TooManyRows(usize),

    /// Result columns do not fit the destination.
    #[error("Scan error: {0}")]
    ScanError(String),

    #[error("context canceled")]
    ContextCanceled,

    #[error("context deadline exceeded")]
    ContextDeadlineExceeded,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlNamedError {
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// True for errors raised because the caller's context ended.
    #[must_use]
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::ContextCanceled | Self::ContextDeadlineExceeded)
    }

    pub(crate) fn bind(msg: impl Into<String>) -> Self {
        Self::BindError(msg.into())
    }

    pub(crate) fn scan(msg: impl Into<String>) -> Self {
        Self::ScanError(msg.into())
    }
}
