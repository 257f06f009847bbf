//! Fact insertion
//!
//! How fact rows are derived from source rows is a per-deployment concern,
//! so the pipeline delegates it to a [`FactLoader`]. [`DefaultFactLoader`]
//! copies every mapped column of new source rows.

use crate::error::SqlResult;
use crate::ledger::{last_closed_param, last_closed_subquery};
use crate::statement::Statement;
use sf_core::schema::{ID_COLUMN, SOURCE_ROW_ID_COLUMN};
use sf_core::{DialectProfile, Schema};

/// Produces the statements that insert new fact rows.
///
/// Implementations must give each fact row the `id` of the source row it
/// came from; foreign-key resolution joins on that.
pub trait FactLoader: Send + Sync {
    /// Short name shown in logs and reports
    fn name(&self) -> &str;

    /// Statements inserting fact rows for source rows above the last closed
    /// snapshot boundary
    fn statements(&self, profile: &DialectProfile, schema: &Schema) -> SqlResult<Vec<Statement>>;
}

/// Copies new source rows into the fact table: `id` from `o_genid`, plus
/// every non-auto-increment fact column that names a `source_column`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactLoader;

impl FactLoader for DefaultFactLoader {
    fn name(&self) -> &str {
        "default"
    }

    fn statements(&self, _profile: &DialectProfile, schema: &Schema) -> SqlResult<Vec<Statement>> {
        let source = schema.source_table()?;
        let fact = schema.fact_table()?;

        let mut target = vec![ID_COLUMN.to_string()];
        let mut select = vec![SOURCE_ROW_ID_COLUMN.to_string()];
        for column in fact.associated_columns() {
            if column.auto_increment || column.name.eq_ignore_ascii_case(ID_COLUMN) {
                continue;
            }
            if let Some(ref src) = column.source_column {
                target.push(column.name.clone());
                select.push(src.clone());
            }
        }

        let sql = format!(
            "INSERT INTO {fact}({target}) SELECT {select} FROM {src} WHERE {genid} > {last} AND {genid} NOT IN (SELECT {id} FROM {fact})",
            fact = fact.name,
            target = target.join(","),
            select = select.join(","),
            src = source.name,
            genid = SOURCE_ROW_ID_COLUMN,
            last = last_closed_subquery(),
            id = ID_COLUMN,
        );
        Ok(vec![Statement::with_params(
            sql,
            vec![last_closed_param(&fact.name)],
        )])
    }
}
