//! Routing to the default data source.

use crate::frontend::router::{Error, RoutingResult, RoutingUnit, TableUnit};
use crate::rule::{Error as RuleError, ShardingRule};

/// All tables on the default data source, under their logic names.
pub fn route(rule: &ShardingRule, tables: &[String]) -> Result<RoutingResult, Error> {
    let data_source = rule
        .default_data_source()
        .ok_or_else(|| RuleError::NoTableRule(tables.join(", ")))?;

    let unit = RoutingUnit::new(data_source)
        .with_tables(tables.iter().map(|table| TableUnit::new(table, table)));

    Ok([unit].into_iter().collect())
}
