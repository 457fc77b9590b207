//! Broadcast routing.

use std::collections::HashSet;

use crate::frontend::router::{Error, RoutingResult, RoutingUnit};
use crate::rule::ShardingRule;

/// Every data source.
pub fn database(rule: &ShardingRule) -> RoutingResult {
    rule.data_source_names()
        .iter()
        .map(|data_source| RoutingUnit::new(data_source))
        .collect()
}

/// Every data node of every table. Without tables, every data source.
pub fn table(rule: &ShardingRule, tables: &[String]) -> Result<RoutingResult, Error> {
    if tables.is_empty() {
        return Ok(database(rule));
    }

    let mut result = RoutingResult::new();

    for table in tables {
        let table_rule = rule.table_rule(table)?;
        for node in table_rule.data_nodes() {
            result.push(
                RoutingUnit::new(&node.data_source)
                    .with_table(table_rule.logic_table(), &node.table),
            );
        }
    }

    Ok(result)
}

/// One data source per database instance. Data sources without
/// a known instance are assumed to be on their own.
pub fn master_instance(rule: &ShardingRule) -> RoutingResult {
    let mut instances = HashSet::new();

    rule.data_source_names()
        .iter()
        .filter(|data_source| match rule.instance_of(data_source) {
            Some(instance) => instances.insert(instance),
            None => true,
        })
        .map(|data_source| RoutingUnit::new(data_source))
        .collect()
}

/// One random data source out of each group of data sources
/// that tables are spread over.
pub fn data_source_group(rule: &ShardingRule) -> Result<RoutingResult, Error> {
    let mut groups: Vec<Vec<String>> = rule
        .table_rules()
        .iter()
        .map(|table| table.data_source_names())
        .collect();

    if let Some(default) = rule.default_data_source() {
        groups.push(vec![default.to_string()]);
    }

    let mut candidates: Vec<Vec<String>> = vec![];
    for group in groups {
        candidates = candidate_groups(candidates, group);
    }

    if candidates.is_empty() {
        candidates.push(rule.data_source_names().to_vec());
    }

    let mut result = RoutingResult::new();
    for group in candidates {
        result.push(RoutingUnit::new(&rule.random_data_source_of(&group)?));
    }

    Ok(result)
}

// Narrow each existing group down to what it shares with `source`.
// Groups sharing nothing are kept as they are, and a `source`
// sharing nothing with any group becomes a group of its own.
fn candidate_groups(target: Vec<Vec<String>>, source: Vec<String>) -> Vec<Vec<String>> {
    let mut overlaps = false;

    let mut candidates: Vec<Vec<String>> = target
        .into_iter()
        .map(|group| {
            let intersection: Vec<String> = group
                .iter()
                .filter(|ds| source.contains(ds))
                .cloned()
                .collect();
            if intersection.is_empty() {
                group
            } else {
                overlaps = true;
                intersection
            }
        })
        .collect();

    if !overlaps && !source.is_empty() {
        candidates.push(source);
    }

    candidates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::router::engine::test::{unit, units};
    use crate::rule::test::{sharding_config, sharding_rule};

    #[test]
    fn test_database() {
        let rule = sharding_rule();
        assert_eq!(
            units(&database(&rule)),
            vec![unit("ds_0", &[]), unit("ds_1", &[])]
        );
    }

    #[test]
    fn test_table() {
        let rule = sharding_rule();
        let result = table(&rule, &["t_order".to_string(), "t_config".to_string()]).unwrap();
        assert_eq!(
            units(&result),
            vec![
                unit("ds_0", &["t_order_0"]),
                unit("ds_0", &["t_order_1"]),
                unit("ds_1", &["t_order_0"]),
                unit("ds_1", &["t_order_1"]),
                unit("ds_0", &["t_config"]),
                unit("ds_1", &["t_config"]),
            ]
        );

        assert_eq!(table(&rule, &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_master_instance() {
        let mut config = sharding_config();
        config.data_sources[1].instance = config.data_sources[0].instance.clone();
        let rule = ShardingRule::new(&config).unwrap();
        assert_eq!(units(&master_instance(&rule)), vec![unit("ds_0", &[])]);

        config.data_sources[0].instance = None;
        config.data_sources[1].instance = None;
        let rule = ShardingRule::new(&config).unwrap();
        assert_eq!(master_instance(&rule).len(), 2);
    }

    #[test]
    fn test_candidate_groups() {
        let group = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

        let candidates = candidate_groups(vec![], group(&["ds_0", "ds_1"]));
        let candidates = candidate_groups(candidates, group(&["ds_1", "ds_2"]));
        assert_eq!(candidates, vec![group(&["ds_1"])]);

        let candidates = candidate_groups(candidates, group(&["ds_3"]));
        assert_eq!(candidates, vec![group(&["ds_1"]), group(&["ds_3"])]);

        let candidates = candidate_groups(candidates, group(&["ds_3", "ds_4"]));
        assert_eq!(candidates, vec![group(&["ds_1"]), group(&["ds_3"])]);
    }

    #[test]
    fn test_data_source_group_disjoint() {
        let config: crate::config::Config = r#"
[[data_sources]]
name = "ds_0"

[[data_sources]]
name = "ds_1"

[[data_sources]]
name = "ds_2"

[[data_sources]]
name = "ds_3"

[[sharding.tables]]
logic_table = "a"
actual_data_nodes = "ds_${0..1}.a"

[[sharding.tables]]
logic_table = "b"
actual_data_nodes = "ds_${2..3}.b"
"#
        .parse()
        .unwrap();
        let rule = ShardingRule::new(&config).unwrap();

        let result = data_source_group(&rule).unwrap();
        let names = result.data_source_names();
        assert_eq!(names.len(), 2);
        assert!(names[0] == "ds_0" || names[0] == "ds_1");
        assert!(names[1] == "ds_2" || names[1] == "ds_3");
    }

    #[test]
    fn test_data_source_group() {
        // Every table spans both data sources, the default is ds_0.
        let rule = sharding_rule();
        let result = data_source_group(&rule).unwrap();
        assert_eq!(units(&result), vec![unit("ds_0", &[])]);

        let mut config = sharding_config();
        config.sharding.tables.clear();
        config.sharding.binding_tables.clear();
        config.sharding.default_data_source = None;
        let rule = ShardingRule::new(&config).unwrap();
        let result = data_source_group(&rule).unwrap();
        assert_eq!(result.len(), 1);
    }
}
