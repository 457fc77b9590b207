//! Sharding rule configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shardgate_types::ShardingValue;

use crate::{Error, Properties};

/// Everything the router needs to know about sharded, bound
/// and broadcast tables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Sharding {
    #[serde(default)]
    pub tables: Vec<TableRule>,
    /// Groups of logic tables sharing the same sharding topology.
    #[serde(default)]
    pub binding_tables: Vec<Vec<String>>,
    /// Tables replicated to every data source.
    #[serde(default)]
    pub broadcast_tables: Vec<String>,
    /// Where unsharded tables live.
    #[serde(default)]
    pub default_data_source: Option<String>,
    #[serde(default)]
    pub default_database_strategy: Option<Strategy>,
    #[serde(default)]
    pub default_table_strategy: Option<Strategy>,
    #[serde(default)]
    pub default_key_generator: Option<KeyGenerator>,
}

impl Sharding {
    pub fn table(&self, name: &str) -> Option<&TableRule> {
        self.tables
            .iter()
            .find(|t| t.logic_table.eq_ignore_ascii_case(name))
    }
}

/// A sharded logic table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TableRule {
    pub logic_table: String,
    /// Inline expression, e.g. `ds_${0..1}.t_order_${0..3}`.
    #[serde(default)]
    pub actual_data_nodes: Option<String>,
    #[serde(default)]
    pub database_strategy: Option<Strategy>,
    #[serde(default)]
    pub table_strategy: Option<Strategy>,
    #[serde(default)]
    pub key_generator: Option<KeyGenerator>,
}

impl TableRule {
    pub fn new(logic_table: &str, actual_data_nodes: Option<&str>) -> Result<Self, Error> {
        if logic_table.trim().is_empty() {
            return Err(Error::Required("logic_table"));
        }

        Ok(Self {
            logic_table: logic_table.to_string(),
            actual_data_nodes: actual_data_nodes.map(|s| s.to_string()),
            ..Default::default()
        })
    }

    pub fn database_strategy(mut self, strategy: Strategy) -> Self {
        self.database_strategy = Some(strategy);
        self
    }

    pub fn table_strategy(mut self, strategy: Strategy) -> Self {
        self.table_strategy = Some(strategy);
        self
    }

    pub fn key_generator(mut self, key_generator: KeyGenerator) -> Self {
        self.key_generator = Some(key_generator);
        self
    }
}

/// How a table is sharded along one dimension (data source or table).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Sharded on a column found in the statement.
    Standard { column: String, algorithm: Algorithm },
    /// Sharded on values supplied out of band.
    Hint { algorithm: Algorithm },
    /// Not sharded along this dimension.
    #[default]
    None,
}

impl Strategy {
    pub fn standard(column: &str, algorithm: Algorithm) -> Result<Self, Error> {
        if column.trim().is_empty() {
            return Err(Error::Required("sharding column"));
        }
        Ok(Self::Standard {
            column: column.to_string(),
            algorithm,
        })
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Standard { column, .. } => Some(column.as_str()),
            _ => None,
        }
    }
}

/// A sharding algorithm, resolved by type from the registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Algorithm {
    /// `MOD`, `HASH_MOD`, `RANGE`, `LIST`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Properties,
    /// Used by `RANGE` and `LIST`.
    #[serde(default)]
    pub mappings: Vec<ShardedMapping>,
}

impl Algorithm {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<ShardedMapping>) -> Self {
        self.mappings = mappings;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ShardedMapping {
    #[serde(default)]
    pub kind: ShardedMappingKind,
    /// Inclusive lower bound for ranges.
    #[serde(default)]
    pub start: Option<ShardingValue>,
    /// Exclusive upper bound for ranges.
    #[serde(default)]
    pub end: Option<ShardingValue>,
    #[serde(default)]
    pub values: HashSet<ShardingValue>,
    /// Target name, e.g. `ds_1` or `t_order_3`.
    pub target: String,
}

impl ShardedMapping {
    pub fn range(
        start: Option<ShardingValue>,
        end: Option<ShardingValue>,
        target: &str,
    ) -> Self {
        Self {
            kind: ShardedMappingKind::Range,
            start,
            end,
            values: HashSet::new(),
            target: target.to_string(),
        }
    }

    pub fn list(values: impl IntoIterator<Item = ShardingValue>, target: &str) -> Self {
        Self {
            kind: ShardedMappingKind::List,
            start: None,
            end: None,
            values: values.into_iter().collect(),
            target: target.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy, Default, Hash, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ShardedMappingKind {
    #[default]
    List,
    Range,
}

/// Distributed key generation for a column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct KeyGenerator {
    /// `SNOWFLAKE` or `UUID`. Falls back to the default
    /// key generator when not set.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub props: Properties,
}

impl KeyGenerator {
    pub fn new(kind: &str, column: &str) -> Result<Self, Error> {
        if column.trim().is_empty() {
            return Err(Error::Required("key generator column"));
        }

        Ok(Self {
            kind: Some(kind.to_string()),
            column: column.to_string(),
            props: Properties::default(),
        })
    }

    pub fn props(mut self, props: Properties) -> Self {
        self.props = props;
        self
    }
}
