//! Compile command implementation - prints generated SQL without a database

use anyhow::{Context, Result};
use sf_core::DialectProfile;
use sf_engine::plan;
use sf_sql::ddl::schema_ddl;
use sf_sql::ledger::ledger_ddl;
use sf_sql::{DefaultFactLoader, Statement, StatementValidator};

use crate::cli::{CompileArgs, CompilePhase, GlobalArgs};
use crate::commands::common;

/// Execute the compile command
pub(crate) async fn execute(args: &CompileArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let profile = match args.dialect {
        Some(ref name) => DialectProfile::named(name)?.with_overrides(&project.config.dialect_overrides),
        None => project.config.dialect_profile(),
    };
    if global.verbose {
        eprintln!("[verbose] Compiling for dialect {}", profile.kind);
    }

    let sections = compile_sections(args.phase, &profile, &project.schema)?;

    if args.validate {
        let validator = StatementValidator::for_profile(&profile)?;
        for (title, statements) in &sections {
            validator
                .validate_all(statements)
                .with_context(|| format!("Generated SQL for '{}' does not parse", title))?;
        }
    }

    for (title, statements) in &sections {
        println!("-- {}", title);
        for statement in statements {
            println!("{};", statement);
        }
        println!();
    }

    if args.validate {
        let total: usize = sections.iter().map(|(_, s)| s.len()).sum();
        eprintln!("All {} statements parse as {}", total, profile.parser_dialect);
    }
    Ok(())
}

/// Titled statement groups for a phase
pub(crate) fn compile_sections(
    phase: CompilePhase,
    profile: &DialectProfile,
    schema: &sf_core::Schema,
) -> Result<Vec<(String, Vec<Statement>)>> {
    let sections = match phase {
        CompilePhase::Ddl => vec![
            ("ledger".to_string(), ledger_ddl(profile)),
            (format!("schema {}", schema.name), schema_ddl(profile, schema)?),
        ],
        CompilePhase::Normalize => {
            // Placeholder timestamp; a real run binds the current time
            plan(profile, schema, &DefaultFactLoader, 0)?
                .into_iter()
                .map(|p| (p.step.to_string(), p.statements))
                .collect()
        }
    };
    Ok(sections)
}
