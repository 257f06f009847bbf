//! Snapshot ledger statements
//!
//! The ledger is one row per normalization run, keyed by fact table name and
//! recording the half-open range of fact ids the run produced. An open row
//! has `lastid` NULL until the run closes it.

use crate::statement::Statement;
use sf_core::{DialectProfile, SqlValue};

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "snapshots";

/// Columns read back by [`select_records`] and [`select_unresolved`], in order
pub const LEDGER_COLUMNS: [&str; 5] = ["id", "name", "tmstmp", "firstid", "lastid"];

/// DDL for the ledger table, preceded by its sequence on sequence-backed dialects
pub fn ledger_ddl(profile: &DialectProfile) -> Vec<Statement> {
    let mut statements = Vec::with_capacity(2);
    if let Some(sequence) = profile.sequence_ddl_for(LEDGER_TABLE) {
        statements.push(Statement::new(sequence));
    }
    statements.push(Statement::new(format!(
        "CREATE TABLE {t} (id INT {auto}, name VARCHAR(255), tmstmp BIGINT, firstid INT, lastid INT, PRIMARY KEY (id))",
        t = LEDGER_TABLE,
        auto = profile.auto_increment_for(LEDGER_TABLE)
    )));
    statements
}

/// Seed row so the first run sees a last-closed boundary of 0
pub fn seed_record(fact_table: &str) -> Statement {
    Statement::with_params(
        format!(
            "INSERT INTO {}(name,firstid,lastid,tmstmp) VALUES (?,0,0,0)",
            LEDGER_TABLE
        ),
        vec![SqlValue::from(fact_table)],
    )
}

/// Open a new ledger row starting after the current maximum fact id.
///
/// On an empty fact table `MAX(id)+1` is NULL, so the second statement
/// defaults the open row's `firstid` to 0.
pub fn open_record(fact_table: &str, timestamp_millis: i64) -> Vec<Statement> {
    vec![
        Statement::with_params(
            format!(
                "INSERT INTO {l}(name,tmstmp,firstid) SELECT ?,?,MAX(id)+1 FROM {f}",
                l = LEDGER_TABLE,
                f = fact_table
            ),
            vec![SqlValue::from(fact_table), SqlValue::Int(timestamp_millis)],
        ),
        Statement::with_params(
            format!(
                "UPDATE {} SET firstid = 0 WHERE name = ? AND firstid IS NULL",
                LEDGER_TABLE
            ),
            vec![SqlValue::from(fact_table)],
        ),
    ]
}

/// Close every open ledger row of `fact_table` at the current maximum fact id
pub fn close_record(fact_table: &str) -> Vec<Statement> {
    vec![
        Statement::with_params(
            format!(
                "UPDATE {l} SET lastid = (SELECT MAX(id) FROM {f}) WHERE name = ? AND lastid IS NULL",
                l = LEDGER_TABLE,
                f = fact_table
            ),
            vec![SqlValue::from(fact_table)],
        ),
        Statement::with_params(
            format!(
                "UPDATE {} SET lastid = 0 WHERE name = ? AND lastid IS NULL",
                LEDGER_TABLE
            ),
            vec![SqlValue::from(fact_table)],
        ),
    ]
}

/// Scalar subquery for the highest closed fact id of `fact_table`.
///
/// Callers embed this text and push [`last_closed_param`] at the matching
/// position of their parameter list.
pub fn last_closed_subquery() -> String {
    format!("(SELECT MAX(lastid) FROM {} WHERE name = ?)", LEDGER_TABLE)
}

/// Parameter bound to the `?` inside [`last_closed_subquery`]
pub fn last_closed_param(fact_table: &str) -> SqlValue {
    SqlValue::from(fact_table)
}

/// Highest closed fact id as a standalone query
pub fn select_last_closed(fact_table: &str) -> Statement {
    Statement::with_params(
        format!("SELECT MAX(lastid) FROM {} WHERE name = ?", LEDGER_TABLE),
        vec![SqlValue::from(fact_table)],
    )
}

/// Every ledger row of `fact_table`, oldest first
pub fn select_records(fact_table: &str) -> Statement {
    Statement::with_params(
        format!(
            "SELECT {} FROM {} WHERE name = ? ORDER BY id",
            LEDGER_COLUMNS.join(", "),
            LEDGER_TABLE
        ),
        vec![SqlValue::from(fact_table)],
    )
}

/// Open ledger rows of `fact_table` left behind by an interrupted run
pub fn select_unresolved(fact_table: &str) -> Statement {
    Statement::with_params(
        format!(
            "SELECT {} FROM {} WHERE name = ? AND lastid IS NULL ORDER BY id",
            LEDGER_COLUMNS.join(", "),
            LEDGER_TABLE
        ),
        vec![SqlValue::from(fact_table)],
    )
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
