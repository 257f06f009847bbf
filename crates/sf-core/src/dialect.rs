//! Dialect profiles
//!
//! A [`DialectProfile`] is a bag of syntax fragments substituted verbatim into
//! generated SQL. Nothing here validates the fragments: a wrong fragment
//! produces SQL the database rejects.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder replaced by the owning table name inside fragments.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// Built-in target database families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// Apache Derby
    Derby,
    /// MySQL / MariaDB
    MySql,
    /// PostgreSQL
    Postgres,
}

impl DialectKind {
    /// All built-in kinds, in display order
    pub const ALL: [DialectKind; 4] = [
        DialectKind::DuckDb,
        DialectKind::Derby,
        DialectKind::MySql,
        DialectKind::Postgres,
    ];
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::DuckDb => write!(f, "duckdb"),
            DialectKind::Derby => write!(f, "derby"),
            DialectKind::MySql => write!(f, "mysql"),
            DialectKind::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for DialectKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckdb" => Ok(DialectKind::DuckDb),
            "derby" => Ok(DialectKind::Derby),
            "mysql" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            _ => Err(CoreError::UnknownDialect {
                name: s.to_string(),
                known: DialectKind::ALL
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// Syntax fragments for one target database family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectProfile {
    /// Which built-in profile this started from
    pub kind: DialectKind,

    /// Column clause making a column auto-incrementing. May contain `{table}`.
    pub auto_increment: String,

    /// Opening of the concatenation function, e.g. `CONCAT(`. Empty for infix dialects.
    pub concat_prefix: String,

    /// Closing of the concatenation function, e.g. `)`. Empty for infix dialects.
    pub concat_suffix: String,

    /// Token placed between concatenated components (`,` inside a function, `||` infix).
    pub concat_operator: String,

    /// Separator placed between natural-key components of a hash key.
    pub hash_separator: String,

    /// Statement run before creating a table that has an auto-increment
    /// column, for databases that back identities with sequences.
    /// May contain `{table}`.
    pub sequence_ddl: Option<String>,

    /// sqlparser dialect name used for offline validation
    pub parser_dialect: String,
}

impl DialectProfile {
    /// Built-in profile for a database family
    pub fn for_kind(kind: DialectKind) -> Self {
        match kind {
            DialectKind::DuckDb => Self {
                kind,
                auto_increment: "DEFAULT nextval('{table}_seq')".to_string(),
                concat_prefix: "CONCAT(".to_string(),
                concat_suffix: ")".to_string(),
                concat_operator: ",".to_string(),
                hash_separator: "%".to_string(),
                sequence_ddl: Some("CREATE SEQUENCE {table}_seq START 1".to_string()),
                parser_dialect: "duckdb".to_string(),
            },
            DialectKind::Derby => Self {
                kind,
                auto_increment: "GENERATED BY DEFAULT AS IDENTITY".to_string(),
                concat_prefix: String::new(),
                concat_suffix: String::new(),
                concat_operator: "||".to_string(),
                hash_separator: "%".to_string(),
                sequence_ddl: None,
                parser_dialect: "generic".to_string(),
            },
            DialectKind::MySql => Self {
                kind,
                auto_increment: "AUTO_INCREMENT".to_string(),
                concat_prefix: "CONCAT(".to_string(),
                concat_suffix: ")".to_string(),
                concat_operator: ",".to_string(),
                hash_separator: "%".to_string(),
                sequence_ddl: None,
                parser_dialect: "mysql".to_string(),
            },
            DialectKind::Postgres => Self {
                kind,
                auto_increment: "GENERATED BY DEFAULT AS IDENTITY".to_string(),
                concat_prefix: "CONCAT(".to_string(),
                concat_suffix: ")".to_string(),
                concat_operator: ",".to_string(),
                hash_separator: "%".to_string(),
                sequence_ddl: None,
                parser_dialect: "postgresql".to_string(),
            },
        }
    }

    /// Built-in profile by name (`duckdb`, `derby`, `mysql`, `postgres`)
    pub fn named(name: &str) -> CoreResult<Self> {
        Ok(Self::for_kind(name.parse()?))
    }

    /// Return a copy with every `Some` override applied
    pub fn with_overrides(mut self, overrides: &DialectOverrides) -> Self {
        if let Some(ref v) = overrides.auto_increment {
            self.auto_increment = v.clone();
        }
        if let Some(ref v) = overrides.concat_prefix {
            self.concat_prefix = v.clone();
        }
        if let Some(ref v) = overrides.concat_suffix {
            self.concat_suffix = v.clone();
        }
        if let Some(ref v) = overrides.concat_operator {
            self.concat_operator = v.clone();
        }
        if let Some(ref v) = overrides.hash_separator {
            self.hash_separator = v.clone();
        }
        if let Some(ref v) = overrides.sequence_ddl {
            self.sequence_ddl = if v.is_empty() { None } else { Some(v.clone()) };
        }
        self
    }

    /// Auto-increment clause for a column of `table`
    pub fn auto_increment_for(&self, table: &str) -> String {
        self.auto_increment.replace(TABLE_PLACEHOLDER, table)
    }

    /// Sequence statement to run before creating `table`, if this dialect needs one
    pub fn sequence_ddl_for(&self, table: &str) -> Option<String> {
        self.sequence_ddl
            .as_ref()
            .map(|ddl| ddl.replace(TABLE_PLACEHOLDER, table))
    }
}

impl Default for DialectProfile {
    fn default() -> Self {
        Self::for_kind(DialectKind::default())
    }
}

/// Per-fragment overrides from `dialect_overrides` in starflow.yml
///
/// An empty `sequence_ddl` string disables the sequence statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectOverrides {
    #[serde(default)]
    pub auto_increment: Option<String>,
    #[serde(default)]
    pub concat_prefix: Option<String>,
    #[serde(default)]
    pub concat_suffix: Option<String>,
    #[serde(default)]
    pub concat_operator: Option<String>,
    #[serde(default)]
    pub hash_separator: Option<String>,
    #[serde(default)]
    pub sequence_ddl: Option<String>,
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
