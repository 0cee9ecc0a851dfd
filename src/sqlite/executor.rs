use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, InterruptHandle};
use tokio::sync::Mutex;

use crate::context::ExecContext;
use crate::error::SqlNamedError;
use crate::executor::ExtExecutor;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

use super::config::SqliteOptions;
use super::params::Params;
use super::query::build_result_set;

pub(crate) type SharedSqliteConnection = Arc<Mutex<Connection>>;

const INTERRUPT_RETRY: Duration = Duration::from_millis(10);

/// A `rusqlite` connection usable from async code.
///
/// Statements run on tokio's blocking pool; calls on one executor are serialized by an
/// internal mutex. Cancelling the context interrupts this call's running statement; a call
/// still queued for the connection just stops waiting.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: SharedSqliteConnection,
    interrupt: Arc<InterruptHandle>,
}

impl SqliteExecutor {
    /// Wrap an already opened connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        let interrupt = Arc::new(conn.get_interrupt_handle());
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        }
    }

    /// Open the database described by `opts` and apply its pragmas.
    ///
    /// # Errors
    ///
    /// Returns `SqlNamedError::ConfigError` for invalid options and
    /// `SqlNamedError::ConnectionError` if the file cannot be opened.
    pub async fn open(opts: SqliteOptions) -> Result<Self, SqlNamedError> {
        opts.validate()?;
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&opts.db_path).map_err(|e| {
                SqlNamedError::ConnectionError(format!(
                    "failed to open SQLite database {}: {e}",
                    opts.db_path
                ))
            })?;
            let pragmas = opts.pragmas();
            if !pragmas.is_empty() {
                conn.execute_batch(&pragmas)?;
            }
            Ok::<_, SqlNamedError>(conn)
        })
        .await
        .map_err(|e| {
            SqlNamedError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
        })??;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `SqlNamedError::ConnectionError` if `SQLite` cannot allocate the database.
    pub async fn open_in_memory() -> Result<Self, SqlNamedError> {
        Self::open(SqliteOptions::in_memory()).await
    }

    /// Execute a batch of SQL statements without parameters (schema setup and the like).
    ///
    /// # Errors
    ///
    /// Returns `SqlNamedError::SqliteError` if any statement fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), SqlNamedError> {
        let sql = sql.to_owned();
        run_blocking(Arc::clone(&self.conn), move |conn| {
            conn.execute_batch(&sql).map_err(SqlNamedError::SqliteError)
        })
        .await
    }

    /// Run `func` against the raw connection on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns whatever `func` returns, or `ExecutionError` if the blocking task panicked.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlNamedError>
    where
        F: FnOnce(&mut Connection) -> Result<R, SqlNamedError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }
}

impl fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteExecutor").finish_non_exhaustive()
    }
}

#[async_trait]
impl ExtExecutor for SqliteExecutor {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::NumberedQuestion
    }

    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let params = Params::convert(args);
        let sql = query.to_owned();

        // Queue for the connection under the context. Giving up while queued leaves the
        // statement currently holding the connection alone.
        let conn = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            conn = Arc::clone(&self.conn).lock_owned() => conn,
        };

        let running = Arc::new(StdMutex::new(true));
        let task_running = Arc::clone(&running);
        let mut task = tokio::task::spawn_blocking(move || {
            let res = conn
                .prepare_cached(&sql)
                .map_err(SqlNamedError::from)
                .and_then(|mut stmt| build_result_set(&mut stmt, params.as_values()));
            // Cleared before the connection is released so a late interrupt cannot reach
            // the next holder.
            *lock_flag(&task_running) = false;
            drop(conn);
            res
        });

        tokio::select! {
            biased;
            joined = &mut task => joined.map_err(join_error)?,
            err = ctx.done() => {
                tracing::warn!(target: "sql_named_ext", %err, "interrupting sqlite statement");
                // An interrupt only reaches statements already running, so repeat it until
                // the task hands the connection back.
                loop {
                    {
                        let running = lock_flag(&running);
                        if *running {
                            self.interrupt.interrupt();
                        }
                    }
                    if tokio::time::timeout(INTERRUPT_RETRY, &mut task).await.is_ok() {
                        break;
                    }
                }
                Err(err)
            }
        }
    }
}

fn lock_flag(flag: &StdMutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(PoisonError::into_inner)
}

fn join_error(e: tokio::task::JoinError) -> SqlNamedError {
    SqlNamedError::ExecutionError(format!("sqlite spawn_blocking join error: {e}"))
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlNamedError>
where
    F: FnOnce(&mut Connection) -> Result<R, SqlNamedError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(join_error)?
}
