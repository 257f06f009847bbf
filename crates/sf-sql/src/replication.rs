//! Lookup replication: replace a referencing lookup with a projection of
//! the referenced one

use crate::statement::Statement;
use sf_core::schema::{HASH_COLUMN, ID_COLUMN};
use sf_core::LookupReplication;

/// Delete every row of the referencing lookup, then copy `id` and the
/// referenced column from the referenced lookup. The copied value doubles
/// as the `hashid`, so the referencing lookup's natural key is that single
/// column.
pub fn replicate_lookup(replication: &LookupReplication) -> Vec<Statement> {
    vec![
        Statement::new(format!("DELETE FROM {}", replication.referencing_lookup)),
        Statement::new(format!(
            "INSERT INTO {ing}({id},{ing_col},{hashid}) SELECT {id},{ed_col},{ed_col} FROM {ed}",
            ing = replication.referencing_lookup,
            ing_col = replication.referencing_column,
            ed = replication.referenced_lookup,
            ed_col = replication.referenced_column,
            id = ID_COLUMN,
            hashid = HASH_COLUMN,
        )),
    ]
}
