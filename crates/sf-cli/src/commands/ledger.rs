//! Ledger command implementation - lists snapshot ledger rows

use anyhow::{Context, Result};
use chrono::DateTime;
use sf_engine::{SnapshotLedger, SnapshotRecord};

use crate::cli::{GlobalArgs, LedgerArgs, OutputFormat};
use crate::commands::common;
use crate::commands::normalize::display_id;

/// Execute the ledger command
pub(crate) async fn execute(args: &LedgerArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let fact = project.schema.fact_table()?;
    let db = common::create_database_connection(&project)?;
    let ledger = SnapshotLedger::new(db.as_ref(), fact.name.clone());
    ledger.ensure_exists().await?;

    let records = if args.unresolved {
        ledger.unresolved().await
    } else {
        ledger.records().await
    }
    .context("Failed to read ledger")?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No ledger rows for '{}'", fact.name);
                return Ok(());
            }
            let rows: Vec<Vec<String>> = records.iter().map(record_row).collect();
            common::print_table(&["ID", "NAME", "OPENED", "FIRSTID", "LASTID", "STATUS"], &rows);
        }
    }
    Ok(())
}

fn record_row(record: &SnapshotRecord) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.name.clone(),
        format_opened(record.tmstmp),
        display_id(record.first_id),
        display_id(record.last_id),
        if record.is_resolved() { "closed" } else { "open" }.to_string(),
    ]
}

/// The seed row carries a zero timestamp
fn format_opened(tmstmp: i64) -> String {
    if tmstmp == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(tmstmp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| tmstmp.to_string())
}
