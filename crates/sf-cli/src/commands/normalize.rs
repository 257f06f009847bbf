//! Normalize command implementation - runs the incremental pipeline

use anyhow::{Context, Result};
use sf_engine::{EngineError, NormalizeOptions, NormalizeReport, Normalizer};

use crate::cli::{GlobalArgs, NormalizeArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// Execute the normalize command
pub(crate) async fn execute(args: &NormalizeArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let profile = project.config.dialect_profile();
    let db = common::create_database_connection(&project)?;

    let options = NormalizeOptions {
        resume: args.resume,
    };
    let result = Normalizer::new(db.as_ref(), &profile, &project.schema)
        .run(options)
        .await;

    let report = match result {
        Ok(report) => report,
        Err(EngineError::UnresolvedSnapshot { fact_table, id }) => {
            eprintln!(
                "Snapshot {} of '{}' was left open by an interrupted run.",
                id, fact_table
            );
            eprintln!("Run `sf normalize --resume` to finish it.");
            return Err(ExitCode(2).into());
        }
        Err(e) => return Err(e).context("Normalize failed"),
    };

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report, global.verbose),
    }
    Ok(())
}

fn print_report(report: &NormalizeReport, verbose: bool) {
    if report.resumed {
        println!("Resumed open snapshot for '{}'\n", report.fact_table);
    }

    let rows: Vec<Vec<String>> = report
        .steps
        .iter()
        .filter(|s| verbose || !s.skipped)
        .map(|s| {
            vec![
                s.step.to_string(),
                s.statements.to_string(),
                if s.skipped {
                    "skipped".to_string()
                } else {
                    s.rows_affected.to_string()
                },
            ]
        })
        .collect();
    common::print_table(&["STEP", "STATEMENTS", "ROWS"], &rows);

    for (lookup, count) in &report.diagnostics.hash_collisions {
        if *count > 0 {
            println!("\n  ! {}: {} natural key(s) collide on hashid", lookup, count);
        }
    }
    for (fk, count) in &report.diagnostics.unmatched_foreign_keys {
        if *count > 0 {
            println!("\n  ! {}: {} new fact row(s) without a match", fk, count);
        }
    }

    if let Some(ref snapshot) = report.snapshot {
        println!(
            "\nSnapshot {} closed: firstid={} lastid={} ({} new fact rows) [{}ms]",
            snapshot.id,
            display_id(snapshot.first_id),
            display_id(snapshot.last_id),
            report.new_fact_rows(),
            report.elapsed_ms
        );
    }
}

pub(crate) fn display_id(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
