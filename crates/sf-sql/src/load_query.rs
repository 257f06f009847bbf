//! Load queries: extract a named logical partition for a downstream consumer

use crate::error::SqlResult;
use crate::ledger::LEDGER_TABLE;
use crate::statement::Statement;
use sf_core::schema::ID_COLUMN;
use sf_core::sql_utils::format_short_name;
use sf_core::{Column, LdmType, LoadPart, Schema, Table, TableKind};

/// Column rendering hooks for load queries.
///
/// Every hook defaults to [`qualified_column`]. Override
/// `decorate_fact_column` or `decorate_attribute_column` to format measures
/// or lookup attributes differently for a given consumer.
pub trait ColumnDecorator {
    /// Fact-typed column of a fact table
    fn decorate_fact_column(&self, table: &Table, column: &Column) -> String {
        qualified_column(table, column)
    }

    /// Attribute-typed column of a lookup table
    fn decorate_attribute_column(&self, table: &Table, column: &Column) -> String {
        qualified_column(table, column)
    }

    /// Every other column
    fn decorate_column(&self, table: &Table, column: &Column) -> String {
        qualified_column(table, column)
    }
}

/// Decorator that renders every column as `<TABLE>.<short_name>`
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDecorator;

impl ColumnDecorator for DefaultDecorator {}

/// `<TABLE>.<short_name>` with the table name upper-cased
pub fn qualified_column(table: &Table, column: &Column) -> String {
    format!(
        "{}.{}",
        table.name.to_uppercase(),
        format_short_name(&column.name)
    )
}

/// Builds column lists, range filters and full statements for load parts
pub struct LoadQueryBuilder<'a, D: ColumnDecorator = DefaultDecorator> {
    schema: &'a Schema,
    decorator: D,
}

impl<'a> LoadQueryBuilder<'a, DefaultDecorator> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            decorator: DefaultDecorator,
        }
    }
}

impl<'a, D: ColumnDecorator> LoadQueryBuilder<'a, D> {
    /// Use a custom decorator
    pub fn with_decorator<E: ColumnDecorator>(self, decorator: E) -> LoadQueryBuilder<'a, E> {
        LoadQueryBuilder {
            schema: self.schema,
            decorator,
        }
    }

    fn table_for(&self, part: &LoadPart) -> SqlResult<&'a Table> {
        Ok(self.schema.table_by_name(&part.table_name())?)
    }

    /// Comma-separated decorated column list, in the part's column order
    pub fn columns(&self, part: &LoadPart) -> SqlResult<String> {
        let table = self.table_for(part)?;
        let mut rendered = Vec::with_capacity(part.columns.len());
        for name in &part.columns {
            let column = table.column_by_name(name)?;
            rendered.push(self.decorate(table, column));
        }
        Ok(rendered.join(","))
    }

    fn decorate(&self, table: &Table, column: &Column) -> String {
        match (table.kind, column.ldm_type) {
            (TableKind::Fact, Some(LdmType::Fact)) => {
                self.decorator.decorate_fact_column(table, column)
            }
            (TableKind::Lookup, Some(LdmType::Attribute)) => {
                self.decorator.decorate_attribute_column(table, column)
            }
            _ => self.decorator.decorate_column(table, column),
        }
    }

    /// Ledger range filter, appended right after the table name.
    ///
    /// Empty unless the part reads a fact table and `snapshot_ids` is
    /// non-empty; otherwise joins the ledger and keeps fact rows whose id lies
    /// within `firstid..=lastid` of any listed ledger row.
    pub fn where_clause(&self, part: &LoadPart, snapshot_ids: &[i64]) -> SqlResult<Statement> {
        let table = self.table_for(part)?;
        if table.kind != TableKind::Fact || snapshot_ids.is_empty() {
            return Ok(Statement::new(String::new()));
        }
        let ledger = LEDGER_TABLE.to_uppercase();
        let placeholders = vec!["?"; snapshot_ids.len()].join(",");
        let sql = format!(
            ",{l} WHERE {t}.{id} BETWEEN {l}.FIRSTID AND {l}.LASTID AND {l}.{id} IN ({p})",
            l = ledger,
            t = table.name.to_uppercase(),
            id = ID_COLUMN.to_uppercase(),
            p = placeholders,
        );
        Ok(Statement::with_params(
            sql,
            snapshot_ids.iter().copied().map(Into::into).collect(),
        ))
    }

    /// Complete `SELECT` for a load part
    pub fn statement(&self, part: &LoadPart, snapshot_ids: &[i64]) -> SqlResult<Statement> {
        let table = self.table_for(part)?;
        let columns = self.columns(part)?;
        let filter = self.where_clause(part, snapshot_ids)?;
        Ok(Statement::with_params(
            format!(
                "SELECT {} FROM {}{}",
                columns,
                table.name.to_uppercase(),
                filter.sql
            ),
            filter.params,
        ))
    }
}

#[cfg(test)]
#[path = "load_query_test.rs"]
mod tests;
