//! sf-db - Database abstraction layer for Starflow
//!
//! This crate provides the `Database` connection-executor trait and its
//! DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
