//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::binder::{BoundQuery, bind_named};
pub use crate::context::ExecContext;
pub use crate::error::SqlNamedError;
pub use crate::executor::ExtExecutor;
pub use crate::named::NamedParams;
pub use crate::named_params;
pub use crate::ops::{exec_sql_for_rows, named_get, named_select};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::scan::{Discard, FromRow, FromValue, Record, RowSink};
pub use crate::translation::{PlaceholderStyle, rebind};
pub use crate::types::{DatabaseType, ParamValue, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresOptions, connect_url};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteExecutor, SqliteOptions};
