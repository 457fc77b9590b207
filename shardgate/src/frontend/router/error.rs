use thiserror::Error;

use super::parser::ExprError;
use super::route::SqlRouteResultBuilderError;
use super::sharding;
use crate::rule;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Rule(#[from] rule::Error),

    #[error("{0}")]
    Sharding(#[from] sharding::Error),

    #[error("{0}")]
    Expr(#[from] ExprError),

    #[error("{0}")]
    Builder(#[from] SqlRouteResultBuilderError),

    #[error("no database route for logic table \"{0}\"")]
    NoDatabaseRoute(String),

    #[error("no table route for logic table \"{table}\" on \"{data_source}\"")]
    NoTableRoute { table: String, data_source: String },

    #[error("{0} statements can't modify more than one table")]
    MultipleTablesModified(&'static str),

    #[error("sharding column must be present in subqueries")]
    SubqueryWithoutShardingColumn,

    #[error("sharding values in subqueries must be the same")]
    SubqueryInconsistent,

    #[error("subquery must route to a single data node, got {0}")]
    SubqueryMultipleUnits(usize),

    #[error("no data source is shared by logic tables {0:?}")]
    NoDataSourceIntersection(Vec<String>),

    #[error("a hint is already active for this unit of work")]
    HintActive,

    #[error("can't update sharding column \"{column}\" of \"{table}\"")]
    ShardingKeyUpdate { table: String, column: String },

    #[error("can't update sharding column \"{0}\" in ON DUPLICATE KEY UPDATE")]
    OnDuplicateKeyShardingColumn(String),

    #[error("master/slave group \"{0}\" has no slave to read from")]
    NoSlave(String),
}
