//! Physical DDL for a schema model

use crate::error::SqlResult;
use crate::ledger::seed_record;
use crate::statement::Statement;
use sf_core::{Column, DialectProfile, Schema, Table, TableKind};

/// Statements creating one table, preceded by its sequence when the dialect
/// backs auto-increment columns with sequences.
///
/// The `PRIMARY KEY` clause is omitted when the table declares no key columns.
pub fn create_table(profile: &DialectProfile, table: &Table) -> Vec<Statement> {
    let mut statements = Vec::with_capacity(2);
    if table.has_auto_increment() {
        if let Some(sequence) = profile.sequence_ddl_for(&table.name) {
            statements.push(Statement::new(sequence));
        }
    }

    let mut definitions: Vec<String> = table
        .columns
        .iter()
        .map(|c| column_definition(profile, &table.name, c))
        .collect();
    let keys: Vec<&str> = table.primary_key_columns().map(|c| c.name.as_str()).collect();
    if !keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", keys.join(",")));
    }

    statements.push(Statement::new(format!(
        "CREATE TABLE {} (\n  {}\n)",
        table.name,
        definitions.join(",\n  ")
    )));
    statements
}

fn column_definition(profile: &DialectProfile, table: &str, column: &Column) -> String {
    let mut def = format!("{} {}", column.name, column.data_type);
    if column.unique {
        def.push_str(" UNIQUE");
    }
    if column.auto_increment {
        def.push(' ');
        def.push_str(&profile.auto_increment_for(table));
    }
    def
}

/// Single-column indexes on every non-key, non-unique source column
pub fn create_source_indexes(table: &Table) -> Vec<Statement> {
    if table.kind != TableKind::Source {
        return Vec::new();
    }
    table
        .columns
        .iter()
        .filter(|c| !c.primary_key && !c.unique)
        .map(|c| {
            Statement::new(format!(
                "CREATE INDEX idx_{t}_{c} ON {t}({c})",
                t = table.name,
                c = c.name
            ))
        })
        .collect()
}

/// Materialization script: every table in declaration order, source indexes
/// and the ledger seed row for the fact table.
///
/// The ledger itself is created separately by
/// [`ledger_ddl`](crate::ledger::ledger_ddl), once per database.
pub fn schema_ddl(profile: &DialectProfile, schema: &Schema) -> SqlResult<Vec<Statement>> {
    let fact = schema.fact_table()?;
    let mut statements = Vec::new();
    for table in &schema.tables {
        statements.extend(create_table(profile, table));
        statements.extend(create_source_indexes(table));
    }
    statements.push(seed_record(&fact.name));
    Ok(statements)
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
