//! dm-db - Executor abstraction layer for duckmig
//!
//! This crate provides the `Executor` trait the migration engine runs
//! statements through, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Executor, Row, SqlParam};
