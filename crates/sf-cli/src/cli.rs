//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Starflow - incremental normalization of a flat source table into a star schema
#[derive(Parser, Debug)]
#[command(name = "sf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new Starflow project
    Init(InitArgs),

    /// Create the ledger and every schema table in the target database
    Materialize(MaterializeArgs),

    /// Run the incremental normalize pipeline for new source rows
    Normalize(NormalizeArgs),

    /// Append a CSV file to the source table
    Extract(ExtractArgs),

    /// Print generated SQL without touching the database
    Compile(CompileArgs),

    /// Show the snapshot ledger
    Ledger(LedgerArgs),

    /// Build (and optionally run) the load query of a load part
    LoadQuery(LoadQueryArgs),
}

/// Output formats for commands that report results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory created)
    pub name: String,

    /// Target dialect (duckdb, derby, mysql, postgres)
    #[arg(long, default_value = "duckdb")]
    pub dialect: String,

    /// DuckDB database path written to starflow.yml
    #[arg(long, default_value = "warehouse.duckdb")]
    pub database_path: String,
}

/// Arguments for the materialize command
#[derive(Args, Debug)]
pub struct MaterializeArgs {
    /// Print the statements instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the normalize command
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Continue a run that left its snapshot open
    #[arg(long)]
    pub resume: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// CSV file whose header names source-table columns
    #[arg(short, long)]
    pub file: String,
}

/// Statement groups the compile command can print
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilePhase {
    /// Ledger and schema DDL
    Ddl,
    /// Normalize pipeline statements
    Normalize,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Which statements to print
    #[arg(long, value_enum, default_value = "ddl")]
    pub phase: CompilePhase,

    /// Override the configured dialect
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Parse every statement with the dialect's SQL parser
    #[arg(long)]
    pub validate: bool,
}

/// Arguments for the ledger command
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Only show rows left open by an interrupted run
    #[arg(long)]
    pub unresolved: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the load-query command
#[derive(Args, Debug)]
pub struct LoadQueryArgs {
    /// Load part name from starflow.yml
    pub part: String,

    /// Ledger ids restricting fact rows (comma-separated)
    #[arg(short, long)]
    pub snapshots: Option<String>,

    /// Run the query and print its rows
    #[arg(short, long)]
    pub execute: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
