//! Runtime table rules: physical data nodes and resolved strategies.

use std::fmt::Display;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;
use shardgate_config::TableRule as TableRuleConfig;

use super::{inline, Error};
use crate::frontend::router::sharding::ShardingStrategy;
use crate::registry::Registry;
use crate::unique_id::KeyGenerator;

/// A physical table on a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DataNode {
    pub data_source: String,
    pub table: String,
}

impl DataNode {
    pub fn new(data_source: &str, table: &str) -> Self {
        Self {
            data_source: data_source.to_string(),
            table: table.to_string(),
        }
    }

    /// Parse `data_source.table`.
    pub fn parse(node: &str) -> Result<Self, Error> {
        match node.trim().split_once('.') {
            Some((data_source, table)) if !data_source.is_empty() && !table.is_empty() => {
                Ok(Self::new(data_source, table))
            }
            _ => Err(Error::InvalidDataNode(node.to_string())),
        }
    }
}

impl Display for DataNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

#[derive(Debug, Clone)]
pub struct TableRule {
    logic_table: String,
    data_nodes: Vec<DataNode>,
    data_sources: IndexSet<String>,
    database_strategy: Option<ShardingStrategy>,
    table_strategy: Option<ShardingStrategy>,
    key_column: Option<String>,
    key_generator: Option<Arc<dyn KeyGenerator>>,
}

impl TableRule {
    /// Build a table rule from configuration.
    ///
    /// `data_sources` are the routable data source names. Without
    /// `actual_data_nodes`, the table lives on all of them under its
    /// logic name.
    pub fn new(
        config: &TableRuleConfig,
        data_sources: &[String],
        registry: &Registry,
    ) -> Result<Self, Error> {
        let data_nodes = match config.actual_data_nodes {
            Some(ref expression) => inline::expand(expression)?
                .iter()
                .map(|node| DataNode::parse(node))
                .collect::<Result<Vec<_>, _>>()?,
            None => data_sources
                .iter()
                .map(|data_source| DataNode::new(data_source, &config.logic_table))
                .collect(),
        };

        if data_nodes.is_empty() {
            return Err(Error::NoDataNodes(config.logic_table.clone()));
        }

        if !data_sources.is_empty() {
            if let Some(node) = data_nodes
                .iter()
                .find(|node| !data_sources.contains(&node.data_source))
            {
                return Err(Error::UnknownDataSource {
                    table: config.logic_table.clone(),
                    data_source: node.data_source.clone(),
                });
            }
        }

        let database_strategy = config
            .database_strategy
            .as_ref()
            .map(|strategy| ShardingStrategy::from_config(strategy, registry))
            .transpose()?;
        let table_strategy = config
            .table_strategy
            .as_ref()
            .map(|strategy| ShardingStrategy::from_config(strategy, registry))
            .transpose()?;

        let (key_column, key_generator) = match config.key_generator {
            Some(ref generator) => {
                // Without a type, the sharding-wide generator is used.
                let key_generator = match generator.kind {
                    Some(ref kind) => Some(registry.key_generator(kind, &generator.props)?),
                    None => None,
                };
                (Some(generator.column.clone()), key_generator)
            }
            None => (None, None),
        };

        Ok(Self::from_nodes(&config.logic_table, data_nodes)
            .with_strategies(database_strategy, table_strategy)
            .with_key(key_column, key_generator))
    }

    /// Table on every data source under its logic name.
    pub fn broadcast(logic_table: &str, data_sources: &[String]) -> Self {
        Self::from_nodes(
            logic_table,
            data_sources
                .iter()
                .map(|data_source| DataNode::new(data_source, logic_table))
                .collect(),
        )
    }

    /// Table on a single data source under its logic name.
    pub fn single(logic_table: &str, data_source: &str) -> Self {
        Self::from_nodes(logic_table, vec![DataNode::new(data_source, logic_table)])
    }

    fn from_nodes(logic_table: &str, data_nodes: Vec<DataNode>) -> Self {
        let data_sources = data_nodes
            .iter()
            .map(|node| node.data_source.clone())
            .collect();

        Self {
            logic_table: logic_table.to_string(),
            data_nodes,
            data_sources,
            database_strategy: None,
            table_strategy: None,
            key_column: None,
            key_generator: None,
        }
    }

    fn with_strategies(
        mut self,
        database_strategy: Option<ShardingStrategy>,
        table_strategy: Option<ShardingStrategy>,
    ) -> Self {
        self.database_strategy = database_strategy;
        self.table_strategy = table_strategy;
        self
    }

    fn with_key(
        mut self,
        key_column: Option<String>,
        key_generator: Option<Arc<dyn KeyGenerator>>,
    ) -> Self {
        self.key_column = key_column;
        self.key_generator = key_generator;
        self
    }

    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    pub fn is_logic_table(&self, name: &str) -> bool {
        self.logic_table.eq_ignore_ascii_case(name)
    }

    pub fn data_nodes(&self) -> &[DataNode] {
        &self.data_nodes
    }

    /// Data sources the table has nodes on, in configuration order.
    pub fn data_source_names(&self) -> Vec<String> {
        self.data_sources.iter().cloned().collect()
    }

    pub fn contains_data_source(&self, data_source: &str) -> bool {
        self.data_sources.contains(data_source)
    }

    /// Physical tables on a data source, in configuration order.
    pub fn actual_table_names(&self, data_source: &str) -> Vec<String> {
        self.data_nodes
            .iter()
            .filter(|node| node.data_source == data_source)
            .map(|node| node.table.clone())
            .collect()
    }

    /// Position of a physical table among the tables on its data source.
    pub fn find_actual_table_index(&self, data_source: &str, actual_table: &str) -> Option<usize> {
        self.data_nodes
            .iter()
            .filter(|node| node.data_source == data_source)
            .position(|node| node.table.eq_ignore_ascii_case(actual_table))
    }

    pub fn database_strategy(&self) -> Option<&ShardingStrategy> {
        self.database_strategy.as_ref()
    }

    pub fn table_strategy(&self) -> Option<&ShardingStrategy> {
        self.table_strategy.as_ref()
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    pub fn key_generator(&self) -> Option<&Arc<dyn KeyGenerator>> {
        self.key_generator.as_ref()
    }
}
