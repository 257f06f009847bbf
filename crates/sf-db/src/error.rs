//! Error types for sf-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// CSV loading error (D004)
    #[error("[D004] CSV load failed: {0}")]
    CsvError(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a driver error raised while running `sql`.
    ///
    /// duckdb::Error does not expose structured variants, so the message is
    /// inspected. Patterns are narrow so function/type errors are not
    /// mistaken for missing tables.
    pub(crate) fn from_duckdb(err: ::duckdb::Error, sql: &str) -> Self {
        let msg = err.to_string();
        let missing_table = (msg.contains("Table with name")
            || msg.contains("Table or view with name"))
            && msg.contains("does not exist");
        if missing_table
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(format!("{}: {}", msg, sql))
        } else {
            DbError::ExecutionError(format!("{}: {}", msg, sql))
        }
    }
}
