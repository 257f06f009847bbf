//! Error types for sf-core

use thiserror::Error;

/// Configuration error type for Starflow
///
/// Everything in here is detected before or during SQL generation and is
/// never worth retrying.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Schema has no table of a required kind
    #[error("[C003] Schema '{schema}' has no {kind} table (exactly one is required)")]
    MissingTable { schema: String, kind: String },

    /// C004: Schema has more than one table of a singular kind
    #[error("[C004] Schema '{schema}' has multiple {kind} tables: {tables} (exactly one is required)")]
    DuplicateTable {
        schema: String,
        kind: String,
        tables: String,
    },

    /// C005: Table lookup by name failed
    #[error("[C005] Table not found in schema: {name}")]
    TableNotFound { name: String },

    /// C006: Column lookup by name failed
    #[error("[C006] Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// C007: Identifier failed validation
    #[error("[C007] Invalid SQL identifier '{ident}': {reason}")]
    InvalidIdentifier { ident: String, reason: String },

    /// C008: Unknown dialect profile name
    #[error("[C008] Unknown dialect '{name}'. Known dialects: {known}")]
    UnknownDialect { name: String, known: String },

    /// C009: Unknown load part name
    #[error("[C009] Load part not found: {name}")]
    LoadPartNotFound { name: String },

    /// C010: Schema model is internally inconsistent
    #[error("[C010] Invalid schema '{schema}': {message}")]
    SchemaInvalid { schema: String, message: String },

    /// C011: IO error with file path context
    #[error("[C011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C012: YAML parse error
    #[error("[C012] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
