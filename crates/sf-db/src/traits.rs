//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sf_core::SqlValue;

/// Connection executor used by every Starflow phase
///
/// Each call runs one statement to completion before returning. No
/// transaction is opened implicitly; wrapping several calls in one is up to
/// the caller.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute SQL with `?` placeholders bound to `params`, returns affected rows
    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first `width` columns of every row
    async fn query_rows(
        &self,
        sql: &str,
        params: &[SqlValue],
        width: usize,
    ) -> DbResult<Vec<Vec<SqlValue>>>;

    /// Run a query and return its first column of its first row
    /// (`SqlValue::Null` when there are no rows)
    async fn query_scalar(&self, sql: &str, params: &[SqlValue]) -> DbResult<SqlValue> {
        let rows = self.query_rows(sql, params, 1).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(SqlValue::Null))
    }

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Append a CSV file to `table`, mapping header names onto `columns`.
    /// Returns the number of rows loaded.
    async fn load_csv(&self, table: &str, columns: &[&str], path: &str) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
