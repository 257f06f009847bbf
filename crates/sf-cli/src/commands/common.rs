//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sf_core::{Config, DbType, Schema};
use sf_db::{Database, DuckDbBackend};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs maps it to the process exit status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: its root, configuration and validated schema
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub schema: Schema,
}

/// Load starflow.yml (or the `--config` override) and the schema it names
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match global.config {
        Some(ref path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;
    let schema = config
        .load_schema(&root)
        .with_context(|| format!("Failed to load schema '{}'", config.schema))?;

    if global.verbose {
        eprintln!(
            "[verbose] Project '{}': schema '{}' ({} tables), dialect {}",
            config.name,
            schema.name,
            schema.tables.len(),
            config.dialect
        );
    }
    Ok(Project {
        root,
        config,
        schema,
    })
}

/// Open the configured database
pub(crate) fn create_database_connection(project: &Project) -> Result<Arc<dyn Database>> {
    let path = project.config.database_path(&project.root);
    if path == ":memory:" {
        log::warn!("In-memory database: tables are discarded when the command exits");
    }
    let db: Arc<dyn Database> = match project.config.database.db_type {
        DbType::DuckDb => {
            Arc::new(DuckDbBackend::new(&path).context("Failed to connect to database")?)
        }
    };
    Ok(db)
}

/// Parse a comma-separated list of ledger ids
pub(crate) fn parse_id_list(list: &str) -> Result<Vec<i64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("Invalid snapshot id '{}'", s))
        })
        .collect()
}

/// Calculate column widths for table output.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", render(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        println!("{}", render(row.clone()));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
