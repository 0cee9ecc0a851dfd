// SQLite module - rusqlite-backed extended executor
//
// - config: open options and builder
// - params: row values to rusqlite values
// - query: result extraction and building
// - executor: `SqliteExecutor` and its `ExtExecutor` impl

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use executor::SqliteExecutor;
pub use params::Params;
pub use query::build_result_set;
