//! Routing engines.
//!
//! [`RoutingEngine::new`] classifies a statement and picks exactly one
//! engine; [`RoutingEngine::route`] runs it. Every engine produces a
//! [`RoutingResult`].

use super::condition::ShardingConditions;
use super::parser::Statement;
use super::{Error, HintManager, RoutingResult};
use crate::rule::ShardingRule;

pub mod broadcast;
pub mod complex;
pub mod default;
pub mod factory;
pub mod standard;
pub mod unicast;

/// Inputs shared by all engines.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    pub rule: &'a ShardingRule,
    pub statement: &'a Statement,
    pub conditions: &'a ShardingConditions,
    pub hint: Option<&'a HintManager>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutingEngine {
    /// Nothing to execute, e.g. `USE`.
    Ignore,
    /// The default data source, for unsharded tables.
    Default { tables: Vec<String> },
    /// Every data source.
    DatabaseBroadcast,
    /// Every data node of every table.
    TableBroadcast { tables: Vec<String> },
    /// One data source per database instance.
    MasterInstanceBroadcast,
    /// One data source per group of data sources sharing tables.
    DataSourceGroupBroadcast,
    /// Any one data source.
    Unicast { tables: Vec<String> },
    /// One sharded table, or tables bound to it.
    Standard { table: String },
    /// Independent sharded tables.
    Complex { tables: Vec<String> },
}

impl RoutingEngine {
    pub fn route(&self, context: &EngineContext<'_>) -> Result<RoutingResult, Error> {
        match self {
            Self::Ignore => Ok(RoutingResult::new()),
            Self::Default { tables } => default::route(context.rule, tables),
            Self::DatabaseBroadcast => Ok(broadcast::database(context.rule)),
            Self::TableBroadcast { tables } => broadcast::table(context.rule, tables),
            Self::MasterInstanceBroadcast => Ok(broadcast::master_instance(context.rule)),
            Self::DataSourceGroupBroadcast => broadcast::data_source_group(context.rule),
            Self::Unicast { tables } => unicast::route(context.rule, tables),
            Self::Standard { table } => standard::route(context, table),
            Self::Complex { tables } => complex::route(context, tables),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Default { .. } => "default",
            Self::DatabaseBroadcast => "database broadcast",
            Self::TableBroadcast { .. } => "table broadcast",
            Self::MasterInstanceBroadcast => "master instance broadcast",
            Self::DataSourceGroupBroadcast => "data source group broadcast",
            Self::Unicast { .. } => "unicast",
            Self::Standard { .. } => "standard",
            Self::Complex { .. } => "complex",
        }
    }
}
