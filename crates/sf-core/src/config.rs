//! Configuration types and parsing for starflow.yml

use crate::dialect::{DialectKind, DialectOverrides, DialectProfile};
use crate::error::{CoreError, CoreResult};
use crate::load::{find_part, LoadPart};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["starflow.yml", "starflow.yaml"];

/// Main project configuration from starflow.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Path of the schema-model YAML, relative to the project root
    #[serde(default = "default_schema_path")]
    pub schema: String,

    /// Built-in dialect profile the SQL is generated for
    #[serde(default)]
    pub dialect: DialectKind,

    /// Per-fragment overrides on top of the dialect profile
    #[serde(default)]
    pub dialect_overrides: DialectOverrides,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Named output partitions for load queries
    #[serde(default)]
    pub load_parts: Vec<LoadPart>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_schema_path() -> String {
    "schema.yml".to_string()
}

impl Config {
    /// Load configuration from a file path
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
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for starflow.yml or starflow.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.schema.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "'schema' must point at a schema YAML file".to_string(),
            });
        }

        let mut names = HashSet::new();
        for part in &self.load_parts {
            if !names.insert(part.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Duplicate load part name '{}'", part.name),
                });
            }
        }

        Ok(())
    }

    /// Dialect profile with overrides applied
    pub fn dialect_profile(&self) -> DialectProfile {
        DialectProfile::for_kind(self.dialect).with_overrides(&self.dialect_overrides)
    }

    /// Get absolute schema path relative to a project root
    pub fn schema_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.schema)
    }

    /// Load and validate the schema model this project points at
    pub fn load_schema(&self, root: &Path) -> CoreResult<Schema> {
        Schema::load(&self.schema_path_absolute(root))
    }

    /// Get a load part by name
    pub fn load_part(&self, name: &str) -> CoreResult<&LoadPart> {
        find_part(&self.load_parts, name)
    }

    /// Database path resolved against a project root (`:memory:` is kept as-is)
    pub fn database_path(&self, root: &Path) -> String {
        if self.database.path == DEFAULT_DB_PATH {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
