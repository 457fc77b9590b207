//! Routing to any one data source.

use crate::frontend::router::{Error, RoutingResult, RoutingUnit, TableUnit};
use crate::rule::ShardingRule;

pub fn route(rule: &ShardingRule, tables: &[String]) -> Result<RoutingResult, Error> {
    let unit = if rule.is_all_broadcast_tables(&names(tables)) {
        RoutingUnit::new(&rule.random_data_source()?)
            .with_tables(tables.iter().map(|table| TableUnit::new(table, table)))
    } else {
        match tables {
            [] => RoutingUnit::new(&rule.random_data_source()?),

            [table] => match rule.find_table_rule(table) {
                Some(table_rule) => match table_rule.data_nodes().first() {
                    Some(node) => RoutingUnit::new(&node.data_source)
                        .with_table(table_rule.logic_table(), &node.table),
                    None => RoutingUnit::new(&rule.random_data_source()?),
                },
                None => RoutingUnit::new(&rule.random_data_source()?),
            },

            tables => {
                let mut table_rules = vec![];
                let mut data_sources: Option<Vec<String>> = None;

                for table in tables {
                    let table_rule = rule.table_rule(table)?;
                    let names = table_rule.data_source_names();
                    data_sources = Some(match data_sources {
                        None => names,
                        Some(mut shared) => {
                            shared.retain(|ds| names.contains(ds));
                            shared
                        }
                    });
                    table_rules.push(table_rule);
                }

                let data_sources = data_sources.unwrap_or_default();
                if data_sources.is_empty() {
                    return Err(Error::NoDataSourceIntersection(tables.to_vec()));
                }

                let data_source = rule.random_data_source_of(&data_sources)?;
                let table_units = table_rules.iter().filter_map(|table_rule| {
                    table_rule
                        .actual_table_names(&data_source)
                        .first()
                        .map(|actual| TableUnit::new(table_rule.logic_table(), actual))
                });

                RoutingUnit::new(&data_source).with_tables(table_units)
            }
        }
    };

    Ok([unit].into_iter().collect())
}

fn names(tables: &[String]) -> Vec<&str> {
    tables.iter().map(|table| table.as_str()).collect()
}
