//! Named parameters for `tokio-postgres` and `rusqlite`.
//!
//! Write queries with `:name` placeholders, pass an optional [`NamedParams`] source, and
//! let [`named_get`], [`named_select`] or [`exec_sql_for_rows`] bind, expand `IN` lists,
//! rebind to the driver's syntax and scan the rows. Placeholders inside string literals
//! and comments are left alone, and `::` casts are kept verbatim rather than unescaped
//! to a single `:`.
//!
//! ```rust,no_run
//! use sql_named_ext::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlNamedError> {
//! let db = SqliteExecutor::open_in_memory().await?;
//! db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
//!     .await?;
//!
//! let ctx = ExecContext::new();
//! exec_sql_for_rows(
//!     &ctx,
//!     &db,
//!     None,
//!     "INSERT INTO users (id, name) VALUES (:id, :name)",
//!     Some(&named_params! { "id" => 1, "name" => "alice" }),
//! )
//! .await?;
//!
//! let mut name = String::new();
//! named_get(&ctx, &db, &mut name, "SELECT name FROM users WHERE id = :id",
//!     Some(&named_params! { "id" => 1 })).await?;
//! assert_eq!(name, "alice");
//! # Ok(()) }
//! ```

pub mod binder;
pub mod context;
pub mod error;
pub mod executor;
pub mod expand;
pub mod named;
pub mod ops;
pub mod prelude;
pub mod results;
pub mod scan;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use binder::{BoundQuery, bind_named};
pub use context::ExecContext;
pub use error::SqlNamedError;
pub use executor::ExtExecutor;
pub use named::NamedParams;
pub use ops::{exec_sql_for_rows, named_get, named_select};
pub use results::{CustomDbRow, ResultSet};
pub use scan::{Discard, FromRow, FromValue, Record, RowSink};
pub use translation::{PlaceholderStyle, rebind};
pub use types::{DatabaseType, ParamValue, RowValues};
