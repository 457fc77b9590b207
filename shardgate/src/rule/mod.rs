//! Sharding rule: the runtime view of the sharding configuration.
//!
//! Built once from [`Config`], with every algorithm, key generator and
//! load balancer resolved through the [`Registry`]. Read-only afterwards.

use std::borrow::Cow;
use std::sync::Arc;

use fnv::FnvHashMap as HashMap;
use rand::Rng;
use shardgate_config::Config;
use shardgate_types::ShardingValue;
use tracing::debug;

use crate::frontend::router::sharding::ShardingStrategy;
use crate::registry::{Registry, DEFAULT_KEY_GENERATOR};
use crate::unique_id::KeyGenerator;

pub mod error;
pub mod inline;
pub mod master_slave;
pub mod table;

pub use error::Error;
pub use master_slave::MasterSlaveRule;
pub use table::{DataNode, TableRule};

#[derive(Debug, Clone)]
pub struct ShardingRule {
    tables: Vec<TableRule>,
    binding_groups: Vec<Vec<String>>,
    broadcast_tables: Vec<String>,
    default_data_source: Option<String>,
    default_database_strategy: ShardingStrategy,
    default_table_strategy: ShardingStrategy,
    default_key_generator: Arc<dyn KeyGenerator>,
    data_sources: Vec<String>,
    instances: HashMap<String, String>,
    master_slave: Vec<MasterSlaveRule>,
}

impl ShardingRule {
    /// Build the rule with the built-in algorithms.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_registry(config, Registry::global())
    }

    pub fn with_registry(config: &Config, registry: &Registry) -> Result<Self, Error> {
        config.check()?;

        let sharding = &config.sharding;
        let mut data_sources = routing_data_sources(config);

        let tables = sharding
            .tables
            .iter()
            .map(|table| TableRule::new(table, &data_sources, registry))
            .collect::<Result<Vec<_>, _>>()?;

        // Without explicit data sources, data nodes define them.
        if data_sources.is_empty() {
            let nodes = tables.iter().flat_map(|table| table.data_nodes());
            for name in nodes
                .map(|node| node.data_source.as_str())
                .chain(sharding.default_data_source.as_deref())
            {
                if !data_sources.iter().any(|ds| ds == name) {
                    data_sources.push(name.to_string());
                }
            }
        }

        let default_database_strategy = sharding
            .default_database_strategy
            .as_ref()
            .map(|strategy| ShardingStrategy::from_config(strategy, registry))
            .transpose()?
            .unwrap_or_default();
        let default_table_strategy = sharding
            .default_table_strategy
            .as_ref()
            .map(|strategy| ShardingStrategy::from_config(strategy, registry))
            .transpose()?
            .unwrap_or_default();

        let default_key_generator = match sharding.default_key_generator {
            Some(ref generator) => registry.key_generator(
                generator.kind.as_deref().unwrap_or(DEFAULT_KEY_GENERATOR),
                &generator.props,
            )?,
            None => registry.key_generator(DEFAULT_KEY_GENERATOR, &Default::default())?,
        };

        let master_slave = config
            .master_slave
            .iter()
            .map(|rule| MasterSlaveRule::new(rule, registry))
            .collect::<Result<Vec<_>, _>>()?;

        let instances = config
            .data_sources
            .iter()
            .filter_map(|ds| {
                ds.instance
                    .as_ref()
                    .map(|instance| (ds.name.clone(), instance.clone()))
            })
            .collect();

        debug!(
            "sharding rule: {} tables on {:?}",
            tables.len(),
            data_sources
        );

        Ok(Self {
            tables,
            binding_groups: sharding.binding_tables.clone(),
            broadcast_tables: sharding.broadcast_tables.clone(),
            default_data_source: sharding.default_data_source.clone(),
            default_database_strategy,
            default_table_strategy,
            default_key_generator,
            data_sources,
            instances,
            master_slave,
        })
    }

    pub fn table_rules(&self) -> &[TableRule] {
        &self.tables
    }

    pub fn find_table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.tables.iter().find(|rule| rule.is_logic_table(logic_table))
    }

    /// Table rule for any table the router may see. Broadcast tables
    /// live on every data source; unknown tables on the default one.
    pub fn table_rule(&self, logic_table: &str) -> Result<Cow<'_, TableRule>, Error> {
        if let Some(rule) = self.find_table_rule(logic_table) {
            return Ok(Cow::Borrowed(rule));
        }

        if self.is_broadcast_table(logic_table) {
            return Ok(Cow::Owned(TableRule::broadcast(
                logic_table,
                &self.data_sources,
            )));
        }

        match self.default_data_source {
            Some(ref data_source) => Ok(Cow::Owned(TableRule::single(logic_table, data_source))),
            None => Err(Error::NoTableRule(logic_table.to_string())),
        }
    }

    /// At least one of the tables is sharded.
    pub fn table_rule_exists(&self, logic_tables: &[&str]) -> bool {
        logic_tables
            .iter()
            .any(|table| self.find_table_rule(table).is_some())
    }

    /// Tables with a sharding rule, in statement order.
    pub fn sharding_logic_tables<'a>(&self, logic_tables: &[&'a str]) -> Vec<&'a str> {
        logic_tables
            .iter()
            .filter(|table| self.find_table_rule(table).is_some())
            .copied()
            .collect()
    }

    pub fn is_broadcast_table(&self, logic_table: &str) -> bool {
        self.broadcast_tables
            .iter()
            .any(|table| table.eq_ignore_ascii_case(logic_table))
    }

    pub fn is_all_broadcast_tables(&self, logic_tables: &[&str]) -> bool {
        !logic_tables.is_empty()
            && logic_tables
                .iter()
                .all(|table| self.is_broadcast_table(table))
    }

    /// None of the tables is sharded or broadcast, and a default
    /// data source exists to put them on.
    pub fn is_all_in_default_data_source(&self, logic_tables: &[&str]) -> bool {
        self.default_data_source.is_some()
            && !logic_tables.is_empty()
            && logic_tables.iter().all(|table| {
                self.find_table_rule(table).is_none() && !self.is_broadcast_table(table)
            })
    }

    /// All tables belong to the same binding group.
    pub fn is_all_binding_tables(&self, logic_tables: &[&str]) -> bool {
        !logic_tables.is_empty()
            && self.binding_groups.iter().any(|group| {
                logic_tables
                    .iter()
                    .all(|table| group.iter().any(|t| t.eq_ignore_ascii_case(table)))
            })
    }

    pub fn find_binding_group(&self, logic_table: &str) -> Option<&[String]> {
        self.binding_groups
            .iter()
            .find(|group| group.iter().any(|t| t.eq_ignore_ascii_case(logic_table)))
            .map(|group| group.as_slice())
    }

    /// Both tables are in the same binding group.
    pub fn is_bound(&self, left: &str, right: &str) -> bool {
        left.eq_ignore_ascii_case(right)
            || self
                .find_binding_group(left)
                .map(|group| group.iter().any(|t| t.eq_ignore_ascii_case(right)))
                .unwrap_or(false)
    }

    /// Physical table of `logic_table` co-located with `other_actual`,
    /// a physical table of the bound `other_logic`. Tables are matched
    /// by position on the data source.
    pub fn binding_actual_table(
        &self,
        data_source: &str,
        logic_table: &str,
        other_logic: &str,
        other_actual: &str,
    ) -> Result<String, Error> {
        let missing = || Error::NoBindingActualTable {
            table: logic_table.to_string(),
            data_source: data_source.to_string(),
            actual_table: other_actual.to_string(),
        };

        let index = self
            .find_table_rule(other_logic)
            .and_then(|rule| rule.find_actual_table_index(data_source, other_actual))
            .ok_or_else(missing)?;

        self.find_table_rule(logic_table)
            .and_then(|rule| rule.actual_table_names(data_source).get(index).cloned())
            .ok_or_else(missing)
    }

    pub fn database_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a ShardingStrategy {
        rule.database_strategy()
            .unwrap_or(&self.default_database_strategy)
    }

    pub fn table_strategy<'a>(&'a self, rule: &'a TableRule) -> &'a ShardingStrategy {
        rule.table_strategy().unwrap_or(&self.default_table_strategy)
    }

    /// The column shards the table along either dimension.
    pub fn is_sharding_column(&self, column: &str, logic_table: &str) -> bool {
        self.find_table_rule(logic_table)
            .map(|rule| {
                self.database_strategy(rule).is_sharding_column(column)
                    || self.table_strategy(rule).is_sharding_column(column)
            })
            .unwrap_or(false)
    }

    pub fn find_generate_key_column(&self, logic_table: &str) -> Option<&str> {
        self.find_table_rule(logic_table)
            .and_then(|rule| rule.key_column())
    }

    /// Generate a key for the table, with its own generator
    /// or the sharding-wide default.
    pub fn generate_key(&self, logic_table: &str) -> Result<ShardingValue, Error> {
        let rule = self
            .find_table_rule(logic_table)
            .ok_or_else(|| Error::NoTableRule(logic_table.to_string()))?;

        let generator = rule.key_generator().unwrap_or(&self.default_key_generator);
        Ok(generator.generate_key()?)
    }

    pub fn default_key_generator(&self) -> &dyn KeyGenerator {
        self.default_key_generator.as_ref()
    }

    pub fn default_data_source(&self) -> Option<&str> {
        self.default_data_source.as_deref()
    }

    /// Data sources the router targets. Master/slave groups appear
    /// under their logical name.
    pub fn data_source_names(&self) -> &[String] {
        &self.data_sources
    }

    /// Any one data source.
    pub fn random_data_source(&self) -> Result<String, Error> {
        random(&self.data_sources).ok_or(Error::NoDataSources)
    }

    /// Any one of the candidates.
    pub fn random_data_source_of(&self, candidates: &[String]) -> Result<String, Error> {
        random(candidates).ok_or(Error::NoDataSources)
    }

    /// Database instance hosting the data source. A master/slave
    /// group is hosted where its master is.
    pub fn instance_of(&self, data_source: &str) -> Option<&str> {
        let physical = self
            .find_master_slave_rule(data_source)
            .map(|rule| rule.master())
            .unwrap_or(data_source);

        self.instances.get(physical).map(|instance| instance.as_str())
    }

    pub fn master_slave_rules(&self) -> &[MasterSlaveRule] {
        &self.master_slave
    }

    /// Master/slave group the data source is part of or named after.
    pub fn find_master_slave_rule(&self, data_source: &str) -> Option<&MasterSlaveRule> {
        self.master_slave
            .iter()
            .find(|rule| rule.contains(data_source))
    }
}

fn random(candidates: &[String]) -> Option<String> {
    if candidates.is_empty() {
        None
    } else {
        candidates
            .get(rand::rng().random_range(0..candidates.len()))
            .cloned()
    }
}

// Configured data sources, with master/slave members replaced
// by their group's logical name.
fn routing_data_sources(config: &Config) -> Vec<String> {
    let mut result: Vec<String> = vec![];

    let names = config
        .data_sources
        .iter()
        .map(|ds| {
            config
                .master_slave
                .iter()
                .find(|rule| rule.members().any(|member| member == ds.name))
                .map(|rule| rule.name.as_str())
                .unwrap_or(ds.name.as_str())
        })
        .chain(config.master_slave.iter().map(|rule| rule.name.as_str()));

    for name in names {
        if !result.iter().any(|ds| ds == name) {
            result.push(name.to_string());
        }
    }

    result
}
