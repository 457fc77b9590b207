//! Routing results.

use std::fmt::Display;

use indexmap::IndexSet;
use serde::Serialize;
use shardgate_types::ShardingValue;

use super::condition::{GeneratedKey, ShardingConditions};
use super::parser::Statement;

/// A logic table and the physical table it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableUnit {
    pub logic_table: String,
    pub actual_table: String,
}

impl TableUnit {
    pub fn new(logic_table: &str, actual_table: &str) -> Self {
        Self {
            logic_table: logic_table.to_string(),
            actual_table: actual_table.to_string(),
        }
    }
}

/// One data source and the physical tables to query on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoutingUnit {
    /// Physical data source, after master/slave routing.
    pub data_source: String,
    /// Data source name used by the sharding rule.
    pub logic_data_source: String,
    pub table_units: Vec<TableUnit>,
}

impl RoutingUnit {
    pub fn new(data_source: &str) -> Self {
        Self {
            data_source: data_source.to_string(),
            logic_data_source: data_source.to_string(),
            table_units: vec![],
        }
    }

    pub fn with_table(mut self, logic_table: &str, actual_table: &str) -> Self {
        self.table_units
            .push(TableUnit::new(logic_table, actual_table));
        self
    }

    pub fn with_tables(mut self, table_units: impl IntoIterator<Item = TableUnit>) -> Self {
        self.table_units.extend(table_units);
        self
    }

    /// Same unit, on another physical data source.
    pub fn with_data_source(&self, data_source: &str) -> Self {
        Self {
            data_source: data_source.to_string(),
            ..self.clone()
        }
    }

    pub fn actual_table(&self, logic_table: &str) -> Option<&str> {
        self.table_units
            .iter()
            .find(|unit| unit.logic_table.eq_ignore_ascii_case(logic_table))
            .map(|unit| unit.actual_table.as_str())
    }
}

impl Display for RoutingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables: Vec<_> = self
            .table_units
            .iter()
            .map(|unit| unit.actual_table.as_str())
            .collect();
        write!(f, "{} [{}]", self.data_source, tables.join(", "))
    }
}

/// Routing units, in the order they were found, without duplicates.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RoutingResult {
    units: IndexSet<RoutingUnit>,
}

impl RoutingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit. Returns false if it was already there.
    pub fn push(&mut self, unit: RoutingUnit) -> bool {
        self.units.insert(unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutingUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.units.len() == 1
    }

    /// Data sources in routing order.
    pub fn data_source_names(&self) -> Vec<String> {
        let names: IndexSet<&str> = self
            .units
            .iter()
            .map(|unit| unit.data_source.as_str())
            .collect();
        names.into_iter().map(String::from).collect()
    }
}

impl FromIterator<RoutingUnit> for RoutingResult {
    fn from_iter<T: IntoIterator<Item = RoutingUnit>>(iter: T) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RoutingResult {
    type Item = RoutingUnit;
    type IntoIter = indexmap::set::IntoIter<RoutingUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

impl<'a> IntoIterator for &'a RoutingResult {
    type Item = &'a RoutingUnit;
    type IntoIter = indexmap::set::Iter<'a, RoutingUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Everything rewriting and execution need to know about a routed statement.
#[derive(Debug, Clone, PartialEq, Serialize, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct SqlRouteResult {
    statement: Statement,
    #[builder(default)]
    conditions: ShardingConditions,
    #[builder(default)]
    generated_key: Option<GeneratedKey>,
    /// Keys generated so far in the unit of work.
    #[builder(default)]
    generated_values: Vec<ShardingValue>,
    routing_result: RoutingResult,
}

impl SqlRouteResult {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn conditions(&self) -> &ShardingConditions {
        &self.conditions
    }

    pub fn generated_key(&self) -> Option<&GeneratedKey> {
        self.generated_key.as_ref()
    }

    pub fn generated_values(&self) -> &[ShardingValue] {
        &self.generated_values
    }

    pub fn routing_result(&self) -> &RoutingResult {
        &self.routing_result
    }

    pub(crate) fn with_routing_result(self, routing_result: RoutingResult) -> Self {
        Self {
            routing_result,
            ..self
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dedup_keeps_order() {
        let mut result = RoutingResult::new();
        assert!(result.push(RoutingUnit::new("ds_1").with_table("t_order", "t_order_1")));
        assert!(result.push(RoutingUnit::new("ds_0").with_table("t_order", "t_order_0")));
        assert!(!result.push(RoutingUnit::new("ds_1").with_table("t_order", "t_order_1")));
        assert!(result.push(RoutingUnit::new("ds_1").with_table("t_order", "t_order_0")));

        assert_eq!(result.len(), 3);
        assert_eq!(result.data_source_names(), vec!["ds_1", "ds_0"]);
    }

    #[test]
    fn test_unit() {
        let unit = RoutingUnit::new("ms_ds")
            .with_table("t_order", "t_order_1")
            .with_data_source("slave_0");
        assert_eq!(unit.data_source, "slave_0");
        assert_eq!(unit.logic_data_source, "ms_ds");
        assert_eq!(unit.actual_table("T_ORDER"), Some("t_order_1"));
        assert_eq!(unit.to_string(), "slave_0 [t_order_1]");
    }

    #[test]
    fn test_builder_requires_routing_result() {
        let result = SqlRouteResultBuilder::default()
            .statement(Statement::Tcl)
            .build();
        assert!(result.is_err());

        let result = SqlRouteResultBuilder::default()
            .statement(Statement::Tcl)
            .routing_result(RoutingResult::new())
            .build()
            .unwrap();
        assert!(result.generated_key().is_none());
    }
}
