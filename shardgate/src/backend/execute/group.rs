//! Grouping routed statements into execution groups.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::Serialize;
use shardgate_types::Datum;

use crate::frontend::router::{RoutingResult, RoutingUnit};

/// How results produced by a group may be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// One connection per statement, cursors can stream.
    MemoryStrictly,
    /// Connections are shared by several statements,
    /// results must be materialized before the connection is reused.
    ConnectionStrictly,
}

impl Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryStrictly => write!(f, "memory_strictly"),
            Self::ConnectionStrictly => write!(f, "connection_strictly"),
        }
    }
}

/// Statement bound for one routing unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionUnit {
    pub routing_unit: RoutingUnit,
    pub sql: String,
    pub params: Vec<Datum>,
}

impl ExecutionUnit {
    pub fn new(routing_unit: RoutingUnit, sql: &str, params: &[Datum]) -> Self {
        Self {
            routing_unit,
            sql: sql.to_string(),
            params: params.to_vec(),
        }
    }

    pub fn data_source(&self) -> &str {
        &self.routing_unit.data_source
    }

    /// One unit per routing unit, all running the same statement.
    pub fn from_routing(result: &RoutingResult, sql: &str, params: &[Datum]) -> Vec<Self> {
        result
            .iter()
            .map(|unit| Self::new(unit.clone(), sql, params))
            .collect()
    }
}

/// Inputs executed together on one connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteGroup<I> {
    pub data_source: String,
    pub mode: ConnectionMode,
    pub inputs: Vec<I>,
}

impl<I> ExecuteGroup<I> {
    pub fn new(data_source: &str, mode: ConnectionMode, inputs: Vec<I>) -> Self {
        Self {
            data_source: data_source.to_string(),
            mode,
            inputs,
        }
    }
}

/// Split execution units into groups.
///
/// Units are grouped by data source, in the order data sources first appear.
/// Each data source gets at most `max_connections` groups of equal size.
pub fn group(
    units: Vec<ExecutionUnit>,
    max_connections: usize,
) -> Vec<ExecuteGroup<ExecutionUnit>> {
    let max_connections = max_connections.max(1);
    let mut by_data_source: IndexMap<String, Vec<ExecutionUnit>> = IndexMap::new();

    for unit in units {
        by_data_source
            .entry(unit.data_source().to_string())
            .or_default()
            .push(unit);
    }

    let mut groups = vec![];

    for (data_source, units) in by_data_source {
        let mode = if max_connections < units.len() {
            ConnectionMode::ConnectionStrictly
        } else {
            ConnectionMode::MemoryStrictly
        };
        let size = units.len().div_ceil(max_connections).max(1);

        let mut units = units.into_iter().peekable();
        while units.peek().is_some() {
            let inputs: Vec<_> = units.by_ref().take(size).collect();
            groups.push(ExecuteGroup::new(&data_source, mode, inputs));
        }
    }

    groups
}

#[cfg(test)]
mod test {
    use super::*;

    fn units(data_sources: &[&str]) -> Vec<ExecutionUnit> {
        data_sources
            .iter()
            .enumerate()
            .map(|(i, ds)| {
                ExecutionUnit::new(
                    RoutingUnit::new(ds).with_table("t_order", &format!("t_order_{}", i)),
                    "SELECT * FROM t_order",
                    &[],
                )
            })
            .collect()
    }

    #[test]
    fn test_group_by_data_source() {
        let groups = group(units(&["ds_0", "ds_1", "ds_0", "ds_1", "ds_0"]), 1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].data_source, "ds_0");
        assert_eq!(groups[0].inputs.len(), 3);
        assert_eq!(groups[0].mode, ConnectionMode::ConnectionStrictly);
        assert_eq!(groups[1].data_source, "ds_1");
        assert_eq!(groups[1].inputs.len(), 2);
        assert_eq!(
            groups[1].inputs[1].routing_unit.actual_table("t_order"),
            Some("t_order_3")
        );
    }

    #[test]
    fn test_group_partitions() {
        let groups = group(units(&["ds_0"; 5]), 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].inputs.len(), 3);
        assert_eq!(groups[1].inputs.len(), 2);
        assert!(groups
            .iter()
            .all(|g| g.mode == ConnectionMode::ConnectionStrictly));

        let groups = group(units(&["ds_0"; 2]), 4);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.inputs.len() == 1));
        assert!(groups.iter().all(|g| g.mode == ConnectionMode::MemoryStrictly));
    }

    #[test]
    fn test_group_empty() {
        assert!(group(vec![], 0).is_empty());
    }
}
