//! sf-core - Core library for Starflow
//!
//! This crate provides the physical schema model, load metadata, dialect
//! profiles, project configuration and identifier utilities shared by every
//! Starflow component.

pub mod config;
pub mod dialect;
pub mod error;
pub mod load;
pub mod schema;
pub mod sql_utils;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod value;

pub use config::{Config, DatabaseConfig, DbType};
pub use dialect::{DialectKind, DialectOverrides, DialectProfile};
pub use error::{CoreError, CoreResult};
pub use load::LoadPart;
pub use schema::{Column, LdmType, LookupReplication, Schema, Table, TableKind};
pub use value::SqlValue;
