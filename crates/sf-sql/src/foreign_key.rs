//! Fact foreign-key backfill

use crate::error::{SqlError, SqlResult};
use crate::hash::hash_key_expr;
use crate::ledger::{last_closed_param, last_closed_subquery};
use crate::statement::Statement;
use sf_core::schema::{HASH_COLUMN, ID_COLUMN, SOURCE_ROW_ID_COLUMN};
use sf_core::{DialectProfile, Schema, Table, TableKind};

const DIM_ALIAS: &str = "d";
const SOURCE_ALIAS: &str = "o";

fn foreign_key_of(dim: &Table) -> SqlResult<String> {
    if !matches!(dim.kind, TableKind::Lookup | TableKind::Reference) {
        return Err(SqlError::WrongTableKind {
            table: dim.name.clone(),
            expected: "lookup or reference".to_string(),
            found: dim.kind.to_string(),
        });
    }
    dim.foreign_key_column().ok_or_else(|| {
        SqlError::WrongTableKind {
            table: dim.name.clone(),
            expected: "dimension with an associated_source_column".to_string(),
            found: dim.kind.to_string(),
        }
    })
}

/// Fill `<associated_source_column>_id` on new fact rows with the surrogate
/// key of the matching dimension row.
///
/// The match joins the fact row to its source row (`o_genid = fact.id`) and
/// the source row's natural-key hash to the dimension `hashid`. Fact rows
/// without a match get NULL.
pub fn resolve_foreign_key(
    profile: &DialectProfile,
    schema: &Schema,
    dim: &Table,
) -> SqlResult<Statement> {
    let fk = foreign_key_of(dim)?;
    let source = schema.source_table()?;
    let fact = schema.fact_table()?;
    let hash = hash_key_expr(profile, &dim.associated_source_columns(), Some(SOURCE_ALIAS));

    let sql = format!(
        "UPDATE {fact} SET {fk} = (SELECT {d}.{id} FROM {dim} {d}, {src} {o} WHERE {hash} = {d}.{hashid} AND {o}.{genid} = {fact}.{id}) WHERE {id} > {last}",
        fact = fact.name,
        fk = fk,
        dim = dim.name,
        src = source.name,
        d = DIM_ALIAS,
        o = SOURCE_ALIAS,
        id = ID_COLUMN,
        hash = hash,
        hashid = HASH_COLUMN,
        genid = SOURCE_ROW_ID_COLUMN,
        last = last_closed_subquery(),
    );
    Ok(Statement::with_params(sql, vec![last_closed_param(&fact.name)]))
}

/// Count of new fact rows whose foreign key to `dim` is still NULL
pub fn unmatched_foreign_key_count(schema: &Schema, dim: &Table) -> SqlResult<Statement> {
    let fk = foreign_key_of(dim)?;
    let fact = schema.fact_table()?;
    let sql = format!(
        "SELECT COUNT(*) FROM {fact} WHERE {id} > {last} AND {fk} IS NULL",
        fact = fact.name,
        id = ID_COLUMN,
        last = last_closed_subquery(),
        fk = fk,
    );
    Ok(Statement::with_params(sql, vec![last_closed_param(&fact.name)]))
}

#[cfg(test)]
#[path = "foreign_key_test.rs"]
mod tests;
