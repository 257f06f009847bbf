//! Statement execution against a [`Database`]

use crate::error::{EngineError, EngineResult};
use sf_core::SqlValue;
use sf_db::Database;
use sf_sql::Statement;

/// Run statements in order, stopping at the first failure.
/// Returns the summed affected-row count.
pub(crate) async fn execute_all(db: &dyn Database, statements: &[Statement]) -> EngineResult<usize> {
    let mut total = 0;
    for statement in statements {
        log::debug!("execute: {}", statement);
        total += db
            .execute_with_params(&statement.sql, &statement.params)
            .await?;
    }
    Ok(total)
}

/// Run a single-value integer query; NULL reads as `None`
pub(crate) async fn query_optional_int(
    db: &dyn Database,
    statement: &Statement,
) -> EngineResult<Option<i64>> {
    log::debug!("query: {}", statement);
    match db.query_scalar(&statement.sql, &statement.params).await? {
        SqlValue::Null => Ok(None),
        SqlValue::Int(v) => Ok(Some(v)),
        other => Err(EngineError::UnexpectedValue {
            query: statement.sql.clone(),
            value: other.to_string(),
        }),
    }
}

/// Run a count query; NULL reads as 0
pub(crate) async fn query_count(db: &dyn Database, statement: &Statement) -> EngineResult<i64> {
    Ok(query_optional_int(db, statement).await?.unwrap_or(0))
}
