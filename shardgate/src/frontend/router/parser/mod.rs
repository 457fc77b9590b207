//! Statements as handed over by the SQL parser.

pub mod metadata;
pub mod statement;

pub use metadata::TableMetas;
pub use statement::*;
