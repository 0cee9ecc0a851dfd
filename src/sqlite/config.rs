use std::time::Duration;

use crate::error::SqlNamedError;

use super::executor::SqliteExecutor;

/// Options for opening a `SQLite` executor.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub busy_timeout: Option<Duration>,
    pub wal: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            busy_timeout: Some(Duration::from_secs(5)),
            wal: true,
        }
    }

    /// Private in-memory database; WAL does not apply there.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            busy_timeout: None,
            wal: false,
        }
    }

    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    pub(crate) fn validate(&self) -> Result<(), SqlNamedError> {
        if self.db_path.trim().is_empty() {
            return Err(SqlNamedError::ConfigError(
                "db_path is required".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn pragmas(&self) -> String {
        let mut pragmas = String::new();
        if self.wal {
            pragmas.push_str("PRAGMA journal_mode = WAL;");
        }
        if let Some(timeout) = self.busy_timeout {
            pragmas.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        pragmas
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opts.busy_timeout = timeout;
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a `SqliteExecutor` with these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlNamedError` if the options are invalid or the database cannot be opened.
    pub async fn build(self) -> Result<SqliteExecutor, SqlNamedError> {
        SqliteExecutor::open(self.finish()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragmas_follow_options() {
        let opts = SqliteOptions::builder("x.db".into())
            .busy_timeout(Some(Duration::from_millis(250)))
            .finish();
        assert_eq!(
            opts.pragmas(),
            "PRAGMA journal_mode = WAL;PRAGMA busy_timeout = 250;"
        );
        assert_eq!(SqliteOptions::in_memory().pragmas(), "");
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = SqliteOptions::new("  ".into()).validate().unwrap_err();
        assert!(matches!(err, SqlNamedError::ConfigError(_)));
    }
}
