//! Extract command implementation - appends a CSV file to the source table

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{ExtractArgs, GlobalArgs};
use crate::commands::common;

/// Execute the extract command
pub(crate) async fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let source = project.schema.source_table()?;

    let path = Path::new(&args.file);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        project.root.join(path)
    };

    // Auto-increment columns (o_genid) are generated by the database
    let columns: Vec<&str> = source
        .columns
        .iter()
        .filter(|c| !c.auto_increment)
        .map(|c| c.name.as_str())
        .collect();
    if global.verbose {
        eprintln!(
            "[verbose] Loading {} into '{}' columns: {}",
            path.display(),
            source.name,
            columns.join(", ")
        );
    }

    let db = common::create_database_connection(&project)?;
    let rows = db
        .load_csv(&source.name, &columns, &path.display().to_string())
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("Loaded {} rows into '{}'", rows, source.name);
    Ok(())
}
