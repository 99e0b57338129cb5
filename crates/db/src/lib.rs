//! Postgres connection pool and migration runner.

pub mod migrate;
pub mod pool;

pub use migrate::run_migrations;
pub use pool::{connect, create_pool, create_pool_with_options};
