use std::future::Future;

use async_trait::async_trait;
use tokio_postgres::{CancelToken, Client, GenericClient, NoTls, Transaction};

use crate::context::ExecContext;
use crate::error::SqlNamedError;
use crate::executor::ExtExecutor;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set_from_statement;

/// Prepare, run and collect one statement on any tokio-postgres client.
async fn fetch_on<C: GenericClient + Sync>(
    client: &C,
    query: &str,
    args: &[RowValues],
) -> Result<ResultSet, SqlNamedError> {
    let stmt = client.prepare(query).await?;
    let params = Params::convert(args);
    let rows = client.query(&stmt, params.as_refs()).await?;
    build_result_set_from_statement(&stmt, &rows)
}

/// Race `work` against `ctx`; when the context wins, ask the server to cancel the query.
async fn run_cancellable<F>(
    ctx: &ExecContext,
    cancel: CancelToken,
    work: F,
) -> Result<ResultSet, SqlNamedError>
where
    F: Future<Output = Result<ResultSet, SqlNamedError>> + Send,
{
    if let Some(err) = ctx.err() {
        return Err(err);
    }
    tokio::select! {
        biased;
        res = work => res,
        err = ctx.done() => {
            tracing::warn!(target: "sql_named_ext", %err, "cancelling postgres query");
            if let Err(e) = cancel.cancel_query(NoTls).await {
                tracing::warn!(target: "sql_named_ext", error = %e, "postgres cancel request failed");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl ExtExecutor for Client {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError> {
        run_cancellable(ctx, self.cancel_token(), fetch_on(self, query, args)).await
    }
}

#[async_trait]
impl<'a> ExtExecutor for Transaction<'a> {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn fetch_rows(
        &self,
        ctx: &ExecContext,
        query: &str,
        args: &[RowValues],
    ) -> Result<ResultSet, SqlNamedError> {
        run_cancellable(ctx, self.cancel_token(), fetch_on(self, query, args)).await
    }
}
