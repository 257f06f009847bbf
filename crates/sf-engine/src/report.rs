//! Normalize run reports

use crate::ledger::SnapshotRecord;
use crate::pipeline::NormalizeStep;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: NormalizeStep,
    /// Statements executed
    pub statements: usize,
    /// Summed affected-row counts reported by the connection
    pub rows_affected: usize,
    /// Skipped because a resumed run already had an open snapshot
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

/// Rows the pipeline dropped or left unresolved without failing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Per lookup table: distinct new natural keys sharing a `hashid` with a
    /// different key
    pub hash_collisions: BTreeMap<String, i64>,
    /// Per fact foreign-key column: new fact rows left NULL
    pub unmatched_foreign_keys: BTreeMap<String, i64>,
}

impl Diagnostics {
    pub fn total_hash_collisions(&self) -> i64 {
        self.hash_collisions.values().sum()
    }

    pub fn total_unmatched_foreign_keys(&self) -> i64 {
        self.unmatched_foreign_keys.values().sum()
    }

    /// Whether anything was dropped or left unresolved
    pub fn has_warnings(&self) -> bool {
        self.total_hash_collisions() > 0 || self.total_unmatched_foreign_keys() > 0
    }
}

/// Result of a normalize run
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeReport {
    pub schema: String,
    pub fact_table: String,
    /// The run continued an open snapshot left by an earlier run
    pub resumed: bool,
    pub steps: Vec<StepReport>,
    /// Ledger row the run closed
    pub snapshot: Option<SnapshotRecord>,
    pub diagnostics: Diagnostics,
    pub elapsed_ms: u64,
}

impl NormalizeReport {
    /// Report for `step`, if it ran or was skipped
    pub fn step(&self, step: NormalizeStep) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    /// Affected rows of `step`, 0 if absent
    pub fn rows_affected(&self, step: NormalizeStep) -> usize {
        self.step(step).map(|s| s.rows_affected).unwrap_or(0)
    }

    /// Fact rows inserted by this run
    pub fn new_fact_rows(&self) -> usize {
        self.rows_affected(NormalizeStep::InsertFacts)
    }
}
