//! Physical schema creation

use crate::error::EngineResult;
use crate::exec::execute_all;
use serde::Serialize;
use sf_core::{DialectProfile, Schema, TableKind};
use sf_db::Database;
use sf_sql::ddl::{create_source_indexes, create_table};
use sf_sql::ledger::seed_record;

/// What [`materialize_schema`] created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    /// Tables created, in creation order
    pub tables: Vec<String>,
    /// Indexes created on the source table
    pub indexes: usize,
    /// Total statements executed, including sequences and the seed row
    pub statements: usize,
}

/// Create every table of the schema in declaration order, index the source
/// table and seed the ledger with a zero row for the fact table.
///
/// The ledger table must already exist. The first failing statement aborts
/// the rest; tables created before it are left in place.
pub async fn materialize_schema(
    db: &dyn Database,
    profile: &DialectProfile,
    schema: &Schema,
) -> EngineResult<MaterializeReport> {
    schema.validate()?;
    let fact = schema.fact_table()?;
    let mut report = MaterializeReport::default();

    for table in &schema.tables {
        let statements = create_table(profile, table);
        execute_all(db, &statements).await?;
        report.statements += statements.len();
        report.tables.push(table.name.clone());
        log::info!("Created {} table '{}'", table.kind, table.name);

        if table.kind == TableKind::Source {
            let indexes = create_source_indexes(table);
            execute_all(db, &indexes).await?;
            report.indexes += indexes.len();
            report.statements += indexes.len();
        }
    }

    execute_all(db, &[seed_record(&fact.name)]).await?;
    report.statements += 1;
    Ok(report)
}

#[cfg(test)]
#[path = "materialize_test.rs"]
mod tests;
