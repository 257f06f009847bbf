//! Error types for sf-engine

use crate::pipeline::NormalizeStep;
use sf_core::CoreError;
use sf_db::DbError;
use sf_sql::SqlError;
use thiserror::Error;

/// Materialization and normalization errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error, detected before any statement runs (N001)
    #[error("[N001] {0}")]
    Core(#[from] CoreError),

    /// Statement generation error (N002)
    #[error("[N002] {0}")]
    Sql(#[from] SqlError),

    /// Statement execution error, passed through from the connection (N003)
    #[error("[N003] {0}")]
    Db(#[from] DbError),

    /// A pipeline step failed; later steps were not run (N004)
    #[error("[N004] Step '{step}' failed: {source}")]
    StepFailed {
        step: NormalizeStep,
        #[source]
        source: Box<EngineError>,
    },

    /// An earlier run left an open ledger row (N005)
    #[error("[N005] Snapshot {id} of '{fact_table}' is still open; resume the run to close it")]
    UnresolvedSnapshot { fact_table: String, id: i64 },

    /// The ledger table has not been created (N006)
    #[error("[N006] Ledger table '{0}' does not exist; materialize the schema first")]
    LedgerMissing(String),

    /// A query returned a value of the wrong shape (N007)
    #[error("[N007] Unexpected value from '{query}': {value}")]
    UnexpectedValue { query: String, value: String },
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
