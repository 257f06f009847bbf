//! sf-engine - Normalization engine for Starflow
//!
//! Executes the statements generated by `sf-sql` against a
//! [`Database`](sf_db::Database): ledger creation, schema materialization
//! and the incremental normalize pipeline.

pub mod error;
mod exec;
pub mod ledger;
pub mod materialize;
pub mod pipeline;
pub mod report;

pub use error::{EngineError, EngineResult};
pub use ledger::{initialize_ledger, SnapshotLedger, SnapshotRecord};
pub use materialize::{materialize_schema, MaterializeReport};
pub use pipeline::{plan, NormalizeOptions, NormalizeStep, Normalizer, PlannedStep};
pub use report::{Diagnostics, NormalizeReport, StepReport};
