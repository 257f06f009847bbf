//! Materialize command implementation - creates the ledger and schema tables

use anyhow::{Context, Result};
use sf_engine::{initialize_ledger, materialize_schema, SnapshotLedger};
use sf_sql::ddl::schema_ddl;
use sf_sql::ledger::ledger_ddl;

use crate::cli::{GlobalArgs, MaterializeArgs};
use crate::commands::common;

/// Execute the materialize command
pub(crate) async fn execute(args: &MaterializeArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let profile = project.config.dialect_profile();

    if args.dry_run {
        let mut statements = ledger_ddl(&profile);
        statements.extend(schema_ddl(&profile, &project.schema)?);
        for statement in &statements {
            println!("{};\n", statement);
        }
        return Ok(());
    }

    let db = common::create_database_connection(&project)?;
    let fact = project.schema.fact_table()?;
    let ledger = SnapshotLedger::new(db.as_ref(), fact.name.clone());

    if ledger.exists().await? {
        println!("Ledger table already exists, not recreating it");
    } else {
        initialize_ledger(db.as_ref(), &profile)
            .await
            .context("Failed to create ledger table")?;
        println!("Created ledger table");
    }

    let report = materialize_schema(db.as_ref(), &profile, &project.schema)
        .await
        .context("Failed to materialize schema")?;

    for table in &report.tables {
        let kind = project
            .schema
            .table_by_name(table)
            .map(|t| t.kind.to_string())
            .unwrap_or_default();
        println!("  ✓ {} ({})", table, kind);
    }
    if global.verbose {
        eprintln!(
            "[verbose] {} statements, {} source indexes",
            report.statements, report.indexes
        );
    }
    println!(
        "\nMaterialized {} tables for schema '{}'",
        report.tables.len(),
        project.schema.name
    );
    Ok(())
}
