//! Error types for sf-sql

use sf_core::CoreError;
use thiserror::Error;

/// SQL generation and validation errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Schema or configuration problem found while generating SQL (S001)
    #[error("[S001] {0}")]
    Config(#[from] CoreError),

    /// A generator was handed a table of the wrong kind (S002)
    #[error("[S002] Table '{table}' is a {found} table, expected {expected}")]
    WrongTableKind {
        table: String,
        expected: String,
        found: String,
    },

    /// Generated SQL failed to parse (S003)
    #[error("[S003] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// No sqlparser dialect by that name (S004)
    #[error("[S004] Unknown parser dialect: {0}")]
    UnknownParserDialect(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
