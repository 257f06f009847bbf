//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use ::duckdb::types::Value;
use ::duckdb::{params_from_iter, Connection};
use async_trait::async_trait;
use sf_core::sql_utils::escape_sql_string;
use sf_core::SqlValue;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", e, path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL with bound parameters synchronously
    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        log::debug!("duckdb execute: {}", sql);
        let conn = self.lock()?;
        conn.execute(sql, params_from_iter(to_duckdb_values(params)))
            .map_err(|e| DbError::from_duckdb(e, sql))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        log::debug!("duckdb execute_batch: {}", sql);
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::from_duckdb(e, sql))
    }

    /// Query rows synchronously
    fn query_rows_sync(
        &self,
        sql: &str,
        params: &[SqlValue],
        width: usize,
    ) -> DbResult<Vec<Vec<SqlValue>>> {
        log::debug!("duckdb query: {}", sql);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| DbError::from_duckdb(e, sql))?;
        let rows = stmt
            .query_map(params_from_iter(to_duckdb_values(params)), |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| DbError::from_duckdb(e, sql))?;

        let mut out = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DbError::from_duckdb(e, sql))?;
            out.push(row.into_iter().map(from_duckdb_value).collect());
        }
        Ok(out)
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let rows = self.query_rows_sync(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND lower(table_name) = lower(?)",
            &[SqlValue::from(schema), SqlValue::from(table)],
            1,
        )?;
        let count = rows
            .first()
            .and_then(|r| r.first())
            .and_then(SqlValue::as_i64)
            .unwrap_or(0);
        Ok(count > 0)
    }
}

fn to_duckdb_values(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Boolean(*b),
            SqlValue::Int(i) => Value::BigInt(*i),
            SqlValue::Float(f) => Value::Double(*f),
            SqlValue::Text(s) => Value::Text(s.clone()),
        })
        .collect()
}

fn from_duckdb_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Bool(b),
        Value::TinyInt(i) => SqlValue::Int(i.into()),
        Value::SmallInt(i) => SqlValue::Int(i.into()),
        Value::Int(i) => SqlValue::Int(i.into()),
        Value::BigInt(i) => SqlValue::Int(i),
        Value::HugeInt(i) => i64::try_from(i)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(i.to_string())),
        Value::UTinyInt(i) => SqlValue::Int(i.into()),
        Value::USmallInt(i) => SqlValue::Int(i.into()),
        Value::UInt(i) => SqlValue::Int(i.into()),
        Value::UBigInt(i) => i64::try_from(i)
            .map(SqlValue::Int)
            .unwrap_or_else(|_| SqlValue::Text(i.to_string())),
        Value::Float(f) => SqlValue::Float(f.into()),
        Value::Double(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        other => SqlValue::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql, &[])
    }

    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.execute_sync(sql, params)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_rows(
        &self,
        sql: &str,
        params: &[SqlValue],
        width: usize,
    ) -> DbResult<Vec<Vec<SqlValue>>> {
        self.query_rows_sync(sql, params, width)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn load_csv(&self, table: &str, columns: &[&str], path: &str) -> DbResult<usize> {
        if !Path::new(path).exists() {
            return Err(DbError::CsvError(format!("file not found: {}", path)));
        }
        let cols = columns.join(",");
        let sql = format!(
            "INSERT INTO {table} ({cols}) SELECT {cols} FROM read_csv_auto('{}')",
            escape_sql_string(path)
        );
        self.execute_sync(&sql, &[])
            .map_err(|e| DbError::CsvError(e.to_string()))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
