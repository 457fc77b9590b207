use thiserror::Error;

use crate::registry;
use crate::unique_id;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] shardgate_config::Error),

    #[error("{0}")]
    Registry(#[from] registry::Error),

    #[error("{0}")]
    KeyGenerator(#[from] unique_id::Error),

    #[error("invalid inline expression \"{0}\"")]
    InlineExpression(String),

    #[error("invalid data node \"{0}\", expected \"data_source.table\"")]
    InvalidDataNode(String),

    #[error("logic table \"{table}\" refers to unknown data source \"{data_source}\"")]
    UnknownDataSource { table: String, data_source: String },

    #[error("logic table \"{0}\" has no data nodes")]
    NoDataNodes(String),

    #[error("no table rule or default data source for logic table \"{0}\"")]
    NoTableRule(String),

    #[error("can't find binding actual table for \"{table}\" on \"{data_source}\" bound to \"{actual_table}\"")]
    NoBindingActualTable {
        table: String,
        data_source: String,
        actual_table: String,
    },

    #[error("no data sources configured")]
    NoDataSources,
}
