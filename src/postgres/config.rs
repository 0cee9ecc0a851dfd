use std::str::FromStr;
use std::time::Duration;

use tokio_postgres::{Client, Config as PgConfig, NoTls};

use crate::error::SqlNamedError;

/// Connection settings for a single Postgres client.
#[derive(Debug, Clone, Default)]
pub struct PostgresOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub connect_timeout: Option<Duration>,
}

impl PostgresOptions {
    #[must_use]
    pub fn builder() -> PostgresOptionsBuilder {
        PostgresOptionsBuilder::default()
    }

    /// Validate and convert into a `tokio_postgres::Config`.
    ///
    /// # Errors
    /// Returns `SqlNamedError::ConfigError` if a required field is missing.
    pub fn to_pg_config(&self) -> Result<PgConfig, SqlNamedError> {
        let Some(dbname) = &self.dbname else {
            return Err(SqlNamedError::ConfigError("dbname is required".to_string()));
        };
        let Some(host) = &self.host else {
            return Err(SqlNamedError::ConfigError("host is required".to_string()));
        };
        let Some(user) = &self.user else {
            return Err(SqlNamedError::ConfigError("user is required".to_string()));
        };

        let mut cfg = PgConfig::new();
        cfg.dbname(dbname).host(host).user(user);
        cfg.port(self.port.unwrap_or(5432));
        if let Some(password) = &self.password {
            cfg.password(password);
        }
        if let Some(timeout) = self.connect_timeout {
            cfg.connect_timeout(timeout);
        }
        Ok(cfg)
    }

    /// Open a client; the connection task is spawned onto the current tokio runtime.
    ///
    /// # Errors
    /// Returns `SqlNamedError::ConfigError` for incomplete options or
    /// `SqlNamedError::ConnectionError` if the server cannot be reached.
    pub async fn connect(&self) -> Result<Client, SqlNamedError> {
        connect_with(self.to_pg_config()?).await
    }
}

/// Fluent builder for `PostgresOptions`.
#[derive(Debug, Clone, Default)]
pub struct PostgresOptionsBuilder {
    opts: PostgresOptions,
}

impl PostgresOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.opts.dbname = Some(dbname.into());
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.opts.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> PostgresOptions {
        self.opts
    }
}

/// Connect using a libpq-style connection string or `postgres://` URL.
///
/// # Errors
/// Returns `SqlNamedError::ConfigError` if the string does not parse or
/// `SqlNamedError::ConnectionError` if the server cannot be reached.
pub async fn connect_url(url: &str) -> Result<Client, SqlNamedError> {
    let cfg = PgConfig::from_str(url)
        .map_err(|e| SqlNamedError::ConfigError(format!("invalid postgres url: {e}")))?;
    connect_with(cfg).await
}

async fn connect_with(cfg: PgConfig) -> Result<Client, SqlNamedError> {
    let (client, connection) = cfg.connect(NoTls).await.map_err(|e| {
        SqlNamedError::ConnectionError(format!("failed to connect to postgres: {e}"))
    })?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "sql_named_ext", error = %e, "postgres connection closed with error");
        }
    });
    Ok(client)
}
