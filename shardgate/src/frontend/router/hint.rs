//! Sharding values supplied outside of the statement.

use indexmap::IndexMap;
use shardgate_types::ShardingValue;

/// Hinted sharding values and routing overrides for one unit of work.
///
/// Obtained through [`RouterContext::hint_manager`](super::RouterContext::hint_manager)
/// and cleared with [`RouterContext::clear_hint`](super::RouterContext::clear_hint).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HintManager {
    database_values: IndexMap<String, Vec<ShardingValue>>,
    table_values: IndexMap<String, Vec<ShardingValue>>,
    database_only: bool,
    master_only: bool,
}

impl HintManager {
    /// Route every table to the data sources this value shards to,
    /// replacing any other database value.
    pub fn set_database_sharding_value(&mut self, value: impl Into<ShardingValue>) -> &mut Self {
        self.database_values.clear();
        self.database_values
            .insert(String::new(), vec![value.into()]);
        self.database_only = true;
        self
    }

    pub fn add_database_sharding_value(
        &mut self,
        logic_table: &str,
        value: impl Into<ShardingValue>,
    ) -> &mut Self {
        if self.database_only {
            self.database_values.clear();
            self.database_only = false;
        }
        push(&mut self.database_values, logic_table, value.into());
        self
    }

    pub fn add_table_sharding_value(
        &mut self,
        logic_table: &str,
        value: impl Into<ShardingValue>,
    ) -> &mut Self {
        push(&mut self.table_values, logic_table, value.into());
        self
    }

    /// Send reads to the master.
    pub fn set_master_route_only(&mut self) -> &mut Self {
        self.master_only = true;
        self
    }

    pub fn is_master_route_only(&self) -> bool {
        self.master_only
    }

    pub fn is_database_sharding_only(&self) -> bool {
        self.database_only
    }

    pub fn database_sharding_values(&self, logic_table: &str) -> &[ShardingValue] {
        let key = if self.database_only {
            String::new()
        } else {
            logic_table.to_lowercase()
        };
        self.database_values
            .get(&key)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn table_sharding_values(&self, logic_table: &str) -> &[ShardingValue] {
        self.table_values
            .get(&logic_table.to_lowercase())
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }
}

fn push(map: &mut IndexMap<String, Vec<ShardingValue>>, table: &str, value: ShardingValue) {
    let values = map.entry(table.to_lowercase()).or_default();
    if !values.contains(&value) {
        values.push(value);
    }
}
