//! Named-parameter fetch and execute helpers.
//!
//! All three operations bind the query with [`bind_named`](crate::binder::bind_named) using
//! the executor's placeholder style, then run it once. Errors come back unchanged; nothing
//! is retried.

use crate::binder::{BoundQuery, bind_named};
use crate::context::ExecContext;
use crate::error::SqlNamedError;
use crate::executor::ExtExecutor;
use crate::named::NamedParams;
use crate::results::CustomDbRow;
use crate::scan::{FromRow, RowSink};

fn safe_bind_named<E: ExtExecutor + ?Sized>(
    db: &E,
    query: &str,
    params: Option<&NamedParams>,
) -> Result<BoundQuery, SqlNamedError> {
    let style = db.placeholder_style();
    let bound = bind_named(query, params, style)?;
    tracing::debug!(
        target: "sql_named_ext",
        style = ?style,
        args = bound.args.len(),
        sql = %bound.sql,
        "bound named query"
    );
    Ok(bound)
}

/// Fetch exactly one row into `dest`.
///
/// `params` may be `None`; `dest` is only written when the call succeeds. Use
/// [`named_select`] or [`exec_sql_for_rows`] to run statements whose rows you want to
/// discard.
///
/// # Errors
///
/// - `BindError` if the query cannot be bound,
/// - `NoRows` if nothing matched, `TooManyRows` if more than one row came back,
/// - `ScanError` if the row does not fit `T`,
/// - context and driver errors as returned by the executor.
///
/// # Examples
/// ```rust,no_run
/// use sql_named_ext::prelude::*;
///
/// # async fn demo(db: &SqliteExecutor) -> Result<(), SqlNamedError> {
/// let ctx = ExecContext::new();
/// let mut name = String::new();
/// named_get(
///     &ctx,
///     db,
///     &mut name,
///     "SELECT name FROM users WHERE id = :id",
///     Some(&named_params! { "id" => 1 }),
/// )
/// .await?;
/// # Ok(()) }
/// ```
pub async fn named_get<E, T>(
    ctx: &ExecContext,
    db: &E,
    dest: &mut T,
    query: &str,
    params: Option<&NamedParams>,
) -> Result<(), SqlNamedError>
where
    E: ExtExecutor + ?Sized,
    T: FromRow + Send,
{
    let bound = safe_bind_named(db, query, params)?;
    let rows = db.fetch_rows(ctx, &bound.sql, &bound.args).await?;
    match rows.results.as_slice() {
        [] => Err(SqlNamedError::NoRows),
        [row] => {
            *dest = T::from_row(row)?;
            Ok(())
        }
        many => Err(SqlNamedError::TooManyRows(many.len())),
    }
}

/// Fetch every row into `dest`.
///
/// Both `dest` and `params` may be `None`. Without a destination the rows are scanned into
/// a throwaway container, which makes this a plain execute for INSERT/UPDATE/DELETE.
///
/// # Errors
///
/// `BindError`, `ScanError`, context and driver errors, unchanged.
///
/// # Examples
/// ```rust,no_run
/// use sql_named_ext::prelude::*;
///
/// # async fn demo(db: &SqliteExecutor) -> Result<(), SqlNamedError> {
/// let ctx = ExecContext::new();
/// let mut ids: Vec<i64> = Vec::new();
/// named_select(
///     &ctx,
///     db,
///     Some(&mut ids),
///     "SELECT id FROM users WHERE id IN (:ids)",
///     Some(&named_params! { "ids" => ParamValue::list([1, 2, 3]) }),
/// )
/// .await?;
/// named_select(&ctx, db, None, "DELETE FROM users", None).await?;
/// # Ok(()) }
/// ```
pub async fn named_select<E>(
    ctx: &ExecContext,
    db: &E,
    dest: Option<&mut dyn RowSink>,
    query: &str,
    params: Option<&NamedParams>,
) -> Result<(), SqlNamedError>
where
    E: ExtExecutor + ?Sized,
{
    let bound = safe_bind_named(db, query, params)?;
    let mut throwaway: Vec<CustomDbRow> = Vec::new();
    let sink: &mut dyn RowSink = match dest {
        Some(dest) => dest,
        None => &mut throwaway,
    };

    let rows = db.fetch_rows(ctx, &bound.sql, &bound.args).await?;
    sink.absorb(rows)
}

/// Run a statement and write whatever it returns to `dest`, or drop it when `dest` is
/// `None`.
///
/// Same behaviour as [`named_select`]; reach for this name when executing is the point
/// and the rows are incidental.
///
/// # Errors
///
/// Exactly those of [`named_select`].
pub async fn exec_sql_for_rows<E>(
    ctx: &ExecContext,
    db: &E,
    dest: Option<&mut dyn RowSink>,
    query: &str,
    params: Option<&NamedParams>,
) -> Result<(), SqlNamedError>
where
    E: ExtExecutor + ?Sized,
{
    named_select(ctx, db, dest, query, params).await
}
