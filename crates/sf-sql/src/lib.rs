//! sf-sql - SQL generation layer for Starflow
//!
//! Every function here is pure: it turns the schema model and a dialect
//! profile into [`Statement`]s and never touches a connection. Identifiers
//! are interpolated verbatim and must come from a validated
//! [`Schema`](sf_core::Schema); literal values are bound parameters.

pub mod ddl;
pub mod error;
pub mod fact;
pub mod foreign_key;
pub mod hash;
pub mod ledger;
pub mod load_query;
pub mod population;
pub mod replication;
pub mod statement;
pub mod validator;

pub use error::{SqlError, SqlResult};
pub use fact::{DefaultFactLoader, FactLoader};
pub use load_query::{ColumnDecorator, DefaultDecorator, LoadQueryBuilder};
pub use statement::Statement;
pub use validator::StatementValidator;
