//! Snapshot ledger manager
//!
//! Each normalization run opens one ledger row right before fact insertion
//! and closes it after foreign-key backfill. Rows are never touched again
//! once closed; the highest closed `lastid` is the boundary every
//! incremental statement filters on.

use crate::error::{EngineError, EngineResult};
use crate::exec::{execute_all, query_optional_int};
use serde::Serialize;
use sf_core::{DialectProfile, SqlValue};
use sf_db::Database;
use sf_sql::ledger::{
    close_record, ledger_ddl, open_record, select_last_closed, select_records,
    select_unresolved, LEDGER_COLUMNS, LEDGER_TABLE,
};
use sf_sql::Statement;

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    pub id: i64,
    /// Fact table the batch loaded into
    pub name: String,
    /// Open time in milliseconds since the epoch (0 for the seed row)
    pub tmstmp: i64,
    pub first_id: Option<i64>,
    pub last_id: Option<i64>,
}

impl SnapshotRecord {
    /// Both boundaries are set
    pub fn is_resolved(&self) -> bool {
        self.first_id.is_some() && self.last_id.is_some()
    }

    fn from_row(row: Vec<SqlValue>, query: &str) -> EngineResult<Self> {
        let unexpected = |value: &SqlValue| EngineError::UnexpectedValue {
            query: query.to_string(),
            value: value.to_string(),
        };
        let [id, name, tmstmp, first_id, last_id]: [SqlValue; 5] =
            row.try_into().map_err(|row: Vec<SqlValue>| EngineError::UnexpectedValue {
                query: query.to_string(),
                value: format!("row of {} columns", row.len()),
            })?;
        Ok(Self {
            id: id.as_i64().ok_or_else(|| unexpected(&id))?,
            name: name.as_str().ok_or_else(|| unexpected(&name))?.to_string(),
            tmstmp: tmstmp.as_i64().unwrap_or(0),
            first_id: first_id.as_i64(),
            last_id: last_id.as_i64(),
        })
    }
}

/// Ledger operations for one fact table
pub struct SnapshotLedger<'a> {
    db: &'a dyn Database,
    fact_table: String,
}

impl<'a> SnapshotLedger<'a> {
    pub fn new(db: &'a dyn Database, fact_table: impl Into<String>) -> Self {
        Self {
            db,
            fact_table: fact_table.into(),
        }
    }

    pub fn fact_table(&self) -> &str {
        &self.fact_table
    }

    /// Whether the ledger table exists in the target database
    pub async fn exists(&self) -> EngineResult<bool> {
        Ok(self.db.relation_exists(LEDGER_TABLE).await?)
    }

    /// Fail with [`EngineError::LedgerMissing`] unless the ledger exists
    pub async fn ensure_exists(&self) -> EngineResult<()> {
        if !self.exists().await? {
            return Err(EngineError::LedgerMissing(LEDGER_TABLE.to_string()));
        }
        Ok(())
    }

    /// Open a ledger row for a new batch; `firstid` is the next fact id,
    /// or 0 on an empty fact table
    pub async fn open(&self, timestamp_millis: i64) -> EngineResult<usize> {
        log::info!("Opening snapshot for '{}'", self.fact_table);
        execute_all(self.db, &open_record(&self.fact_table, timestamp_millis)).await
    }

    /// Close every open row at the current maximum fact id, or 0 on an empty
    /// fact table
    pub async fn close(&self) -> EngineResult<usize> {
        log::info!("Closing snapshot for '{}'", self.fact_table);
        execute_all(self.db, &close_record(&self.fact_table)).await
    }

    /// Highest closed `lastid`; `None` when the fact table has no ledger rows
    pub async fn last_closed(&self) -> EngineResult<Option<i64>> {
        query_optional_int(self.db, &select_last_closed(&self.fact_table)).await
    }

    /// All rows of this fact table, oldest first
    pub async fn records(&self) -> EngineResult<Vec<SnapshotRecord>> {
        self.read(&select_records(&self.fact_table)).await
    }

    /// Rows left open by an interrupted run
    pub async fn unresolved(&self) -> EngineResult<Vec<SnapshotRecord>> {
        self.read(&select_unresolved(&self.fact_table)).await
    }

    /// Most recent row
    pub async fn latest(&self) -> EngineResult<Option<SnapshotRecord>> {
        Ok(self.records().await?.pop())
    }

    async fn read(&self, statement: &Statement) -> EngineResult<Vec<SnapshotRecord>> {
        let rows = self
            .db
            .query_rows(&statement.sql, &statement.params, LEDGER_COLUMNS.len())
            .await?;
        rows.into_iter()
            .map(|row| SnapshotRecord::from_row(row, &statement.sql))
            .collect()
    }
}

/// Create the ledger table. Must run once per database; a second call fails
/// with the connection's duplicate-table error.
pub async fn initialize_ledger(db: &dyn Database, profile: &DialectProfile) -> EngineResult<usize> {
    log::info!("Creating ledger table '{}'", LEDGER_TABLE);
    execute_all(db, &ledger_ddl(profile)).await
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
