//! CLI command implementations

pub(crate) mod common;
pub(crate) mod compile;
pub(crate) mod extract;
pub(crate) mod init;
pub(crate) mod ledger;
pub(crate) mod load_query;
pub(crate) mod materialize;
pub(crate) mod normalize;
