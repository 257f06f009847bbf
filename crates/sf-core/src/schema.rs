//! Physical schema model
//!
//! A [`Schema`] describes one unit of transformation: a single denormalized
//! source table, a single fact table and the dimension tables derived from
//! it. The model is built once (usually from YAML) and is read-only for the
//! rest of the run.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::validate_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Generated row identity column of the source table
pub const SOURCE_ROW_ID_COLUMN: &str = "o_genid";

/// Surrogate key column of fact and dimension tables
pub const ID_COLUMN: &str = "id";

/// Natural-key hash column of dimension tables
pub const HASH_COLUMN: &str = "hashid";

/// Role a table plays in the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Flat, denormalized input table
    Source,
    /// One row per measured event
    Fact,
    /// Deduplicated attribute values, many fact rows to one lookup row
    Lookup,
    /// Dimension with a 1:1 correspondence to source rows
    ConnectionPoint,
    /// Lookup whose content is replicated from another lookup
    Reference,
}

impl TableKind {
    /// Whether tables of this kind are dimensions keyed by `hashid`
    pub fn is_dimension(self) -> bool {
        matches!(
            self,
            TableKind::Lookup | TableKind::ConnectionPoint | TableKind::Reference
        )
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Source => write!(f, "source"),
            TableKind::Fact => write!(f, "fact"),
            TableKind::Lookup => write!(f, "lookup"),
            TableKind::ConnectionPoint => write!(f, "connection point"),
            TableKind::Reference => write!(f, "reference"),
        }
    }
}

/// Logical-model type of a column, used only when building load queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LdmType {
    Fact,
    Attribute,
    Label,
    ConnectionPoint,
    Reference,
    Date,
    #[serde(other)]
    Other,
}

/// A physical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Storage type, emitted verbatim into DDL
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub auto_increment: bool,

    /// Source-table column this column is populated from
    #[serde(default)]
    pub source_column: Option<String>,

    /// Logical-model type tag
    #[serde(default)]
    pub ldm_type: Option<LdmType>,
}

impl Column {
    /// Create a plain column with no flags
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            unique: false,
            auto_increment: false,
            source_column: None,
            ldm_type: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark the column as populated from a source-table column
    pub fn from_source(mut self, source_column: impl Into<String>) -> Self {
        self.source_column = Some(source_column.into());
        self
    }

    pub fn with_ldm_type(mut self, ldm_type: LdmType) -> Self {
        self.ldm_type = Some(ldm_type);
        self
    }
}

/// A physical table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Table {
    pub name: String,

    pub kind: TableKind,

    /// Ordered column list
    pub columns: Vec<Column>,

    /// Names the fact foreign-key column (`<associated_source_column>_id`)
    /// of dimension tables
    #[serde(default)]
    pub associated_source_column: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: Vec::new(),
            associated_source_column: None,
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn associated_with(mut self, source_column: impl Into<String>) -> Self {
        self.associated_source_column = Some(source_column.into());
        self
    }

    /// Columns populated from the source table, in declaration order.
    ///
    /// For dimension tables these form the natural key.
    pub fn associated_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.source_column.is_some())
    }

    /// Source-table columns feeding [`associated_columns`](Self::associated_columns)
    pub fn associated_source_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| c.source_column.as_deref())
            .collect()
    }

    /// Primary-key columns in declaration order
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Look up a column by name (case-insensitive)
    pub fn column_by_name(&self, name: &str) -> CoreResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Fact-table column this dimension's surrogate key is written to
    pub fn foreign_key_column(&self) -> Option<String> {
        self.associated_source_column
            .as_ref()
            .map(|c| format!("{}_{}", c, ID_COLUMN))
    }
}

/// Directs the replication engine to replace `referencing_lookup` with a
/// projection of `referenced_lookup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupReplication {
    pub referenced_lookup: String,
    pub referenced_column: String,
    pub referencing_lookup: String,
    pub referencing_column: String,
}

/// One unit of transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    pub name: String,

    pub tables: Vec<Table>,

    #[serde(default)]
    pub lookup_replications: Vec<LookupReplication>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            lookup_replications: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_replication(mut self, replication: LookupReplication) -> Self {
        self.lookup_replications.push(replication);
        self
    }

    /// Load and validate a schema model from a YAML file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a schema model from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let schema: Schema = serde_yaml::from_str(content)?;
        schema.validate()?;
        log::debug!(
            "Loaded schema '{}' ({} tables, {} lookup replications)",
            schema.name,
            schema.tables.len(),
            schema.lookup_replications.len()
        );
        Ok(schema)
    }

    /// Tables of one kind, in declaration order
    pub fn tables_of_kind(&self, kind: TableKind) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(move |t| t.kind == kind)
    }

    pub fn lookup_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables_of_kind(TableKind::Lookup)
    }

    pub fn connection_point_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables_of_kind(TableKind::ConnectionPoint)
    }

    pub fn reference_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables_of_kind(TableKind::Reference)
    }

    /// The single source table
    pub fn source_table(&self) -> CoreResult<&Table> {
        self.single_table(TableKind::Source)
    }

    /// The single fact table
    pub fn fact_table(&self) -> CoreResult<&Table> {
        self.single_table(TableKind::Fact)
    }

    fn single_table(&self, kind: TableKind) -> CoreResult<&Table> {
        let found: Vec<&Table> = self.tables_of_kind(kind).collect();
        match found.as_slice() {
            [table] => Ok(table),
            [] => Err(CoreError::MissingTable {
                schema: self.name.clone(),
                kind: kind.to_string(),
            }),
            many => Err(CoreError::DuplicateTable {
                schema: self.name.clone(),
                kind: kind.to_string(),
                tables: many
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Look up a table by name (case-insensitive)
    pub fn table_by_name(&self, name: &str) -> CoreResult<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::TableNotFound {
                name: name.to_string(),
            })
    }

    /// Check every structural invariant the SQL generators rely on.
    ///
    /// Identifier validity is checked here once so generated SQL can
    /// interpolate names directly.
    pub fn validate(&self) -> CoreResult<()> {
        let source = self.source_table()?;
        let fact = self.fact_table()?;

        let mut seen = HashSet::new();
        for table in &self.tables {
            validate_identifier(&table.name)?;
            if !seen.insert(table.name.to_ascii_lowercase()) {
                return Err(self.invalid(format!("table '{}' is defined twice", table.name)));
            }
            self.validate_table(table, source)?;
        }

        if !source.has_column(SOURCE_ROW_ID_COLUMN) {
            return Err(self.invalid(format!(
                "source table '{}' must have a '{}' column",
                source.name, SOURCE_ROW_ID_COLUMN
            )));
        }
        if !fact.has_column(ID_COLUMN) {
            return Err(self.invalid(format!(
                "fact table '{}' must have an '{}' column",
                fact.name, ID_COLUMN
            )));
        }

        for dim in self.lookup_tables().chain(self.reference_tables()) {
            if let Some(fk) = dim.foreign_key_column() {
                if !fact.has_column(&fk) {
                    return Err(self.invalid(format!(
                        "fact table '{}' is missing foreign key column '{}' for '{}'",
                        fact.name, fk, dim.name
                    )));
                }
            }
        }

        for replication in &self.lookup_replications {
            self.validate_replication(replication)?;
        }

        Ok(())
    }

    fn validate_table(&self, table: &Table, source: &Table) -> CoreResult<()> {
        let mut columns = HashSet::new();
        for column in &table.columns {
            validate_identifier(&column.name)?;
            if !columns.insert(column.name.to_ascii_lowercase()) {
                return Err(self.invalid(format!(
                    "column '{}' is defined twice in '{}'",
                    column.name, table.name
                )));
            }
            if let Some(ref src) = column.source_column {
                validate_identifier(src)?;
                if table.kind != TableKind::Source && !source.has_column(src) {
                    return Err(self.invalid(format!(
                        "column '{}.{}' references unknown source column '{}'",
                        table.name, column.name, src
                    )));
                }
            }
        }

        if !table.kind.is_dimension() {
            return Ok(());
        }

        match table.associated_source_column {
            Some(ref assoc) => validate_identifier(assoc)?,
            None => {
                return Err(self.invalid(format!(
                    "{} table '{}' needs an associated_source_column",
                    table.kind, table.name
                )))
            }
        }
        for required in [ID_COLUMN, HASH_COLUMN] {
            if !table.has_column(required) {
                return Err(self.invalid(format!(
                    "{} table '{}' must have a '{}' column",
                    table.kind, table.name, required
                )));
            }
        }
        if table.associated_columns().next().is_none() {
            return Err(self.invalid(format!(
                "{} table '{}' has no column with a source_column",
                table.kind, table.name
            )));
        }
        Ok(())
    }

    fn validate_replication(&self, replication: &LookupReplication) -> CoreResult<()> {
        let referenced = self.table_by_name(&replication.referenced_lookup)?;
        let referencing = self.table_by_name(&replication.referencing_lookup)?;
        referenced.column_by_name(&replication.referenced_column)?;
        referencing.column_by_name(&replication.referencing_column)?;
        if !referenced.kind.is_dimension() || !referencing.kind.is_dimension() {
            return Err(self.invalid(format!(
                "lookup replication '{}' -> '{}' must connect two dimension tables",
                referenced.name, referencing.name
            )));
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> CoreError {
        CoreError::SchemaInvalid {
            schema: self.name.clone(),
            message,
        }
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
