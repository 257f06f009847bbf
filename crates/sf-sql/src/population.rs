//! Dimension population from new source rows
//!
//! Both generators read only source rows above the last closed snapshot
//! boundary and skip natural keys whose hash the dimension already holds.

use crate::error::{SqlError, SqlResult};
use crate::hash::hash_key_expr;
use crate::ledger::{last_closed_param, last_closed_subquery};
use crate::statement::Statement;
use sf_core::schema::{HASH_COLUMN, ID_COLUMN, SOURCE_ROW_ID_COLUMN};
use sf_core::{DialectProfile, Schema, Table, TableKind};

pub(crate) fn expect_kind(table: &Table, expected: TableKind) -> SqlResult<()> {
    if table.kind != expected {
        return Err(SqlError::WrongTableKind {
            table: table.name.clone(),
            expected: expected.to_string(),
            found: table.kind.to_string(),
        });
    }
    Ok(())
}

/// Insert distinct new natural keys of a lookup table.
///
/// `hashid` is the hash of the associated source columns; the remaining
/// target columns are copied from their source columns. Keys of one batch
/// sharing a hash collapse to the earliest source row carrying it, so
/// `hashid` stays unique and the later keys are dropped.
pub fn populate_lookup(
    profile: &DialectProfile,
    schema: &Schema,
    lookup: &Table,
) -> SqlResult<Statement> {
    expect_kind(lookup, TableKind::Lookup)?;
    populate(profile, schema, lookup, false)
}

/// Insert one connection-point row per new source row.
///
/// The dimension `id` is the source row id, so duplicate natural keys within
/// one batch produce duplicate dimension rows.
pub fn populate_connection_point(
    profile: &DialectProfile,
    schema: &Schema,
    connection_point: &Table,
) -> SqlResult<Statement> {
    expect_kind(connection_point, TableKind::ConnectionPoint)?;
    populate(profile, schema, connection_point, true)
}

fn populate(
    profile: &DialectProfile,
    schema: &Schema,
    dim: &Table,
    with_row_id: bool,
) -> SqlResult<Statement> {
    let source = schema.source_table()?;
    let fact = schema.fact_table()?;
    let source_columns = dim.associated_source_columns();
    let hash = hash_key_expr(profile, &source_columns, None);

    let mut target = Vec::new();
    let mut select = Vec::new();
    if with_row_id {
        target.push(ID_COLUMN.to_string());
        select.push(SOURCE_ROW_ID_COLUMN.to_string());
    }
    target.push(HASH_COLUMN.to_string());
    select.push(hash.clone());
    for column in dim.associated_columns() {
        target.push(column.name.clone());
    }
    select.extend(source_columns.iter().map(|c| c.to_string()));

    let new_rows = format!(
        "{genid} > {last} AND {hash} NOT IN (SELECT {hashid} FROM {dim})",
        genid = SOURCE_ROW_ID_COLUMN,
        last = last_closed_subquery(),
        hash = hash,
        hashid = HASH_COLUMN,
        dim = dim.name,
    );
    let sql = if with_row_id {
        format!(
            "INSERT INTO {dim}({target}) SELECT DISTINCT {select} FROM {src} WHERE {new_rows}",
            dim = dim.name,
            target = target.join(","),
            select = select.join(","),
            src = source.name,
        )
    } else {
        format!(
            "INSERT INTO {dim}({target}) SELECT {select} FROM {src} WHERE {genid} IN (SELECT MIN({genid}) FROM {src} WHERE {new_rows} GROUP BY {hash})",
            dim = dim.name,
            target = target.join(","),
            select = select.join(","),
            src = source.name,
            genid = SOURCE_ROW_ID_COLUMN,
            hash = hash,
        )
    };
    Ok(Statement::with_params(sql, vec![last_closed_param(&fact.name)]))
}

/// Queries counting distinct new natural keys of a lookup that lose their
/// row to another key with the same hash.
///
/// The first counts keys sharing a hash within the batch; the second counts
/// keys whose hash already belongs to a lookup row with different values.
/// The sum is the collision count. A non-zero count means the hash
/// separator occurs inside key values.
pub fn hash_collision_counts(
    profile: &DialectProfile,
    schema: &Schema,
    lookup: &Table,
) -> SqlResult<Vec<Statement>> {
    expect_kind(lookup, TableKind::Lookup)?;
    let source = schema.source_table()?;
    let fact = schema.fact_table()?;
    let source_columns = lookup.associated_source_columns();
    let batch = format!(
        "(SELECT DISTINCT {hash} AS hash_key,{cols} FROM {src} WHERE {genid} > {last}) batch_keys",
        hash = hash_key_expr(profile, &source_columns, None),
        cols = source_columns.join(","),
        src = source.name,
        genid = SOURCE_ROW_ID_COLUMN,
        last = last_closed_subquery(),
    );

    let within_batch = format!("SELECT COUNT(*) - COUNT(DISTINCT hash_key) FROM {}", batch);

    let same_values: Vec<String> = lookup
        .associated_columns()
        .filter_map(|c| c.source_column.as_deref().map(|src| (c.name.as_str(), src)))
        .map(|(dim_col, src_col)| {
            format!(
                "(d.{dim_col} = batch_keys.{src_col} OR (d.{dim_col} IS NULL AND batch_keys.{src_col} IS NULL))"
            )
        })
        .collect();
    let against_existing = format!(
        "SELECT COUNT(*) FROM {batch} WHERE hash_key IN (SELECT {hashid} FROM {dim}) AND NOT EXISTS (SELECT 1 FROM {dim} d WHERE d.{hashid} = batch_keys.hash_key AND {same})",
        batch = batch,
        hashid = HASH_COLUMN,
        dim = lookup.name,
        same = same_values.join(" AND "),
    );

    Ok(vec![
        Statement::with_params(within_batch, vec![last_closed_param(&fact.name)]),
        Statement::with_params(against_existing, vec![last_closed_param(&fact.name)]),
    ])
}

#[cfg(test)]
#[path = "population_test.rs"]
mod tests;
