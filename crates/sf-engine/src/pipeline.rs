//! The normalize pipeline
//!
//! A run is a fixed sequence of [`NormalizeStep`]s. The ledger row opened
//! before fact insertion is the recovery checkpoint: while it is open the
//! last closed boundary has not moved, so every incremental step can be
//! re-run and only touches rows above that boundary.

use crate::error::{EngineError, EngineResult};
use crate::exec::{execute_all, query_count};
use crate::ledger::SnapshotLedger;
use crate::report::{Diagnostics, NormalizeReport, StepReport};
use serde::Serialize;
use sf_core::{DialectProfile, Schema};
use sf_db::Database;
use sf_sql::fact::{DefaultFactLoader, FactLoader};
use sf_sql::foreign_key::{resolve_foreign_key, unmatched_foreign_key_count};
use sf_sql::ledger::{close_record, open_record};
use sf_sql::population::{hash_collision_counts, populate_connection_point, populate_lookup};
use sf_sql::replication::replicate_lookup;
use sf_sql::Statement;
use std::fmt;
use std::time::Instant;

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeStep {
    ReplicateLookups,
    PopulateLookups,
    PopulateConnectionPoints,
    OpenSnapshot,
    InsertFacts,
    ResolveLookupKeys,
    ResolveReferenceKeys,
    CloseSnapshot,
}

impl NormalizeStep {
    pub const ALL: [NormalizeStep; 8] = [
        NormalizeStep::ReplicateLookups,
        NormalizeStep::PopulateLookups,
        NormalizeStep::PopulateConnectionPoints,
        NormalizeStep::OpenSnapshot,
        NormalizeStep::InsertFacts,
        NormalizeStep::ResolveLookupKeys,
        NormalizeStep::ResolveReferenceKeys,
        NormalizeStep::CloseSnapshot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NormalizeStep::ReplicateLookups => "replicate_lookups",
            NormalizeStep::PopulateLookups => "populate_lookups",
            NormalizeStep::PopulateConnectionPoints => "populate_connection_points",
            NormalizeStep::OpenSnapshot => "open_snapshot",
            NormalizeStep::InsertFacts => "insert_facts",
            NormalizeStep::ResolveLookupKeys => "resolve_lookup_keys",
            NormalizeStep::ResolveReferenceKeys => "resolve_reference_keys",
            NormalizeStep::CloseSnapshot => "close_snapshot",
        }
    }
}

impl fmt::Display for NormalizeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for [`Normalizer::run`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Continue a run that left its snapshot open instead of refusing to start
    pub resume: bool,
}

/// Statements of one step, produced before anything executes
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub step: NormalizeStep,
    pub statements: Vec<Statement>,
}

/// Runs the normalize phase for one schema over one connection
pub struct Normalizer<'a> {
    db: &'a dyn Database,
    profile: &'a DialectProfile,
    schema: &'a Schema,
    fact_loader: &'a dyn FactLoader,
}

impl<'a> Normalizer<'a> {
    pub fn new(db: &'a dyn Database, profile: &'a DialectProfile, schema: &'a Schema) -> Self {
        Self {
            db,
            profile,
            schema,
            fact_loader: &DefaultFactLoader,
        }
    }

    /// Replace the default fact loader
    pub fn with_fact_loader(mut self, fact_loader: &'a dyn FactLoader) -> Self {
        self.fact_loader = fact_loader;
        self
    }

    /// Generate the statements of every step with this normalizer's fact loader
    pub fn plan(&self, timestamp_millis: i64) -> EngineResult<Vec<PlannedStep>> {
        plan(self.profile, self.schema, self.fact_loader, timestamp_millis)
    }

    /// Run every step in order and close the batch's snapshot.
    ///
    /// Refuses to start while an earlier run's snapshot is open unless
    /// `options.resume` is set; a resumed run skips opening a new snapshot.
    /// The first failing statement stops the run with
    /// [`EngineError::StepFailed`], leaving the snapshot open.
    pub async fn run(&self, options: NormalizeOptions) -> EngineResult<NormalizeReport> {
        let started = Instant::now();
        let timestamp = chrono::Utc::now().timestamp_millis();
        let plan = self.plan(timestamp)?;
        let diagnostics_plan = self.plan_diagnostics()?;
        let fact = self.schema.fact_table()?.name.clone();

        let ledger = SnapshotLedger::new(self.db, fact.clone());
        ledger.ensure_exists().await?;
        let open = ledger.unresolved().await?;
        let resumed = match open.first() {
            Some(record) if !options.resume => {
                return Err(EngineError::UnresolvedSnapshot {
                    fact_table: fact,
                    id: record.id,
                })
            }
            Some(record) => {
                log::info!("Resuming open snapshot {} of '{}'", record.id, fact);
                true
            }
            None => false,
        };

        let mut diagnostics = Diagnostics::default();
        for (lookup, statements) in &diagnostics_plan.hash_collisions {
            let mut count = 0;
            for statement in statements {
                count += query_count(self.db, statement).await?;
            }
            if count > 0 {
                log::warn!(
                    "{} new natural key(s) of '{}' collide on hashid",
                    count,
                    lookup
                );
            }
            diagnostics.hash_collisions.insert(lookup.clone(), count);
        }

        let mut steps = Vec::with_capacity(plan.len());
        for planned in &plan {
            let step = planned.step;
            if resumed && step == NormalizeStep::OpenSnapshot {
                steps.push(StepReport {
                    step,
                    statements: 0,
                    rows_affected: 0,
                    skipped: true,
                });
                continue;
            }

            if step == NormalizeStep::CloseSnapshot {
                for (fk, statement) in &diagnostics_plan.unmatched_foreign_keys {
                    let count = query_count(self.db, statement)
                        .await
                        .map_err(|e| step_failed(step, e))?;
                    if count > 0 {
                        log::warn!("{} new fact row(s) have no match for '{}'", count, fk);
                    }
                    diagnostics.unmatched_foreign_keys.insert(fk.clone(), count);
                }
            }

            let rows_affected = execute_all(self.db, &planned.statements)
                .await
                .map_err(|e| step_failed(step, e))?;
            log::info!(
                "{}: {} statement(s), {} row(s)",
                step,
                planned.statements.len(),
                rows_affected
            );
            steps.push(StepReport {
                step,
                statements: planned.statements.len(),
                rows_affected,
                skipped: false,
            });
        }

        Ok(NormalizeReport {
            schema: self.schema.name.clone(),
            fact_table: fact,
            resumed,
            steps,
            snapshot: ledger.latest().await?,
            diagnostics,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn plan_diagnostics(&self) -> EngineResult<DiagnosticsPlan> {
        let (profile, schema) = (self.profile, self.schema);
        let mut plan = DiagnosticsPlan::default();
        for lookup in schema.lookup_tables() {
            plan.hash_collisions.push((
                lookup.name.clone(),
                hash_collision_counts(profile, schema, lookup)?,
            ));
        }
        for dim in schema.lookup_tables().chain(schema.reference_tables()) {
            if let Some(fk) = dim.foreign_key_column() {
                plan.unmatched_foreign_keys
                    .push((fk, unmatched_foreign_key_count(schema, dim)?));
            }
        }
        Ok(plan)
    }
}

/// Generate the statements of every normalize step without a connection.
///
/// Fails on configuration problems before anything could execute.
pub fn plan(
    profile: &DialectProfile,
    schema: &Schema,
    fact_loader: &dyn FactLoader,
    timestamp_millis: i64,
) -> EngineResult<Vec<PlannedStep>> {
    schema.validate()?;
    NormalizeStep::ALL
        .iter()
        .map(|&step| {
            Ok(PlannedStep {
                step,
                statements: plan_step(profile, schema, fact_loader, step, timestamp_millis)?,
            })
        })
        .collect()
}

fn plan_step(
    profile: &DialectProfile,
    schema: &Schema,
    fact_loader: &dyn FactLoader,
    step: NormalizeStep,
    timestamp_millis: i64,
) -> EngineResult<Vec<Statement>> {
    let fact = &schema.fact_table()?.name;
    let statements = match step {
        NormalizeStep::ReplicateLookups => schema
            .lookup_replications
            .iter()
            .flat_map(replicate_lookup)
            .collect(),
        NormalizeStep::PopulateLookups => schema
            .lookup_tables()
            .map(|t| populate_lookup(profile, schema, t))
            .collect::<Result<Vec<_>, _>>()?,
        NormalizeStep::PopulateConnectionPoints => schema
            .connection_point_tables()
            .map(|t| populate_connection_point(profile, schema, t))
            .collect::<Result<Vec<_>, _>>()?,
        NormalizeStep::OpenSnapshot => open_record(fact, timestamp_millis),
        NormalizeStep::InsertFacts => fact_loader.statements(profile, schema)?,
        NormalizeStep::ResolveLookupKeys => schema
            .lookup_tables()
            .map(|t| resolve_foreign_key(profile, schema, t))
            .collect::<Result<Vec<_>, _>>()?,
        NormalizeStep::ResolveReferenceKeys => schema
            .reference_tables()
            .map(|t| resolve_foreign_key(profile, schema, t))
            .collect::<Result<Vec<_>, _>>()?,
        NormalizeStep::CloseSnapshot => close_record(fact),
    };
    Ok(statements)
}

#[derive(Default)]
struct DiagnosticsPlan {
    hash_collisions: Vec<(String, Vec<Statement>)>,
    unmatched_foreign_keys: Vec<(String, Statement)>,
}

fn step_failed(step: NormalizeStep, source: EngineError) -> EngineError {
    log::error!("Step '{}' failed: {}", step, source);
    EngineError::StepFailed {
        step,
        source: Box::new(source),
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
