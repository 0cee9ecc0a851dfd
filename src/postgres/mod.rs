// PostgreSQL module - tokio-postgres clients and transactions as extended executors
//
// - config: connection options and builders
// - params: `ToSql` for row values
// - query: result extraction and building
// - executor: `ExtExecutor` for `Client` and `Transaction`

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{PostgresOptions, PostgresOptionsBuilder, connect_url};
pub use params::Params;
pub use query::{build_result_set_from_statement, postgres_extract_value};
