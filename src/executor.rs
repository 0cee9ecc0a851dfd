use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ExecContext;
use crate::error::SqlNamedError;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

/// A live connection or transaction that can run positional queries under a context and
/// knows its driver's placeholder syntax.
///
/// Implementations decide whether they may be shared between concurrent callers; nothing
/// in this crate adds locking on top.
#[async_trait]
pub trait ExtExecutor: Send + Sync {
    /// Placeholder syntax queries must use before reaching [`fetch_rows`](Self::fetch_rows).
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Runs a single statement with positional arguments and returns every row it produced.
    ///
    /// Statements that return nothing (INSERT/UPDATE/DELETE) yield an empty set. When `ctx`
    /// ends mid-flight the implementation aborts the statement and returns the context
    /// error.
    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError>;
}

#[async_trait]
impl<E: ExtExecutor + ?Sized> ExtExecutor for &E {
    fn placeholder_style(&self) -> PlaceholderStyle {
        (**self).placeholder_style()
    }

    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError> {
        (**self).fetch_rows(ctx, query, args).await
    }
}

#[async_trait]
impl<E: ExtExecutor + ?Sized> ExtExecutor for Arc<E> {
    fn placeholder_style(&self) -> PlaceholderStyle {
        (**self).placeholder_style()
    }

    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError> {
        (**self).fetch_rows(ctx, query, args).await
    }
}
