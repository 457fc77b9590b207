//! Routing for independent sharded tables.
//!
//! Each group of bound tables is routed on its own, then the groups
//! are combined on every data source they share.

use super::{standard, EngineContext};
use crate::frontend::router::{Error, RoutingResult, RoutingUnit, TableUnit};
use crate::rule;

pub fn route(context: &EngineContext<'_>, tables: &[String]) -> Result<RoutingResult, Error> {
    let mut results = vec![];
    let mut bound: Vec<&str> = vec![];

    for table in tables {
        let table_rule = match context.rule.find_table_rule(table) {
            Some(table_rule) => table_rule,
            None => continue,
        };

        if !bound.iter().any(|t| t.eq_ignore_ascii_case(table)) {
            results.push(standard::route(context, table_rule.logic_table())?);
        }

        if let Some(group) = context.rule.find_binding_group(table) {
            bound.extend(group.iter().map(|t| t.as_str()));
        }
    }

    if results.len() > 1 {
        cartesian(tables, &results)
    } else {
        results
            .pop()
            .ok_or_else(|| rule::Error::NoTableRule(tables.join(", ")).into())
    }
}

/// One unit per data source shared by all results and per
/// combination of their table units on it.
pub fn cartesian(tables: &[String], results: &[RoutingResult]) -> Result<RoutingResult, Error> {
    let mut data_sources = match results.first() {
        Some(first) => first.data_source_names(),
        None => return Ok(RoutingResult::new()),
    };
    for result in &results[1..] {
        let names = result.data_source_names();
        data_sources.retain(|ds| names.contains(ds));
    }

    if data_sources.is_empty() {
        return Err(Error::NoDataSourceIntersection(tables.to_vec()));
    }

    let mut result = RoutingResult::new();

    for data_source in data_sources {
        let groups: Vec<Vec<&[TableUnit]>> = results
            .iter()
            .map(|result| {
                result
                    .iter()
                    .filter(|unit| unit.data_source == data_source)
                    .map(|unit| unit.table_units.as_slice())
                    .collect()
            })
            .collect();

        for combination in product(&groups) {
            result.push(
                RoutingUnit::new(&data_source)
                    .with_tables(combination.into_iter().flatten().cloned()),
            );
        }
    }

    Ok(result)
}

fn product<T: Copy>(groups: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut result: Vec<Vec<T>> = vec![vec![]];

    for group in groups {
        result = result
            .iter()
            .flat_map(|prefix| {
                group.iter().map(move |item| {
                    let mut combination = prefix.clone();
                    combination.push(*item);
                    combination
                })
            })
            .collect();
    }

    result
}
