//! Load-query command implementation - builds the extract query of a load part

use anyhow::{Context, Result};
use sf_core::SqlValue;
use sf_sql::LoadQueryBuilder;

use crate::cli::{GlobalArgs, LoadQueryArgs};
use crate::commands::common;

/// Execute the load-query command
pub(crate) async fn execute(args: &LoadQueryArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let part = project.config.load_part(&args.part)?;
    let snapshot_ids = match args.snapshots {
        Some(ref list) => common::parse_id_list(list)?,
        None => Vec::new(),
    };

    let statement = LoadQueryBuilder::new(&project.schema)
        .statement(part, &snapshot_ids)
        .with_context(|| format!("Failed to build load query for '{}'", part.name))?;

    if !args.execute {
        println!("{}", statement);
        return Ok(());
    }

    if global.verbose {
        eprintln!("[verbose] {}", statement);
    }
    let db = common::create_database_connection(&project)?;
    let rows = db
        .query_rows(&statement.sql, &statement.params, part.columns.len())
        .await
        .context("Load query failed")?;

    let headers: Vec<&str> = part.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell).collect())
        .collect();
    common::print_table(&headers, &rows);
    println!("\n{} rows", rows.len());
    Ok(())
}

fn cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Text(s) => s.clone(),
        other => other.to_string(),
    }
}
