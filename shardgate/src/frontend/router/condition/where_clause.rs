//! Sharding conditions from WHERE clauses.

use indexmap::IndexMap;
use shardgate_types::{Datum, ShardingValue};
use tracing::trace;

use super::{RouteValue, ShardingCondition};
use crate::frontend::router::parser::{AndPredicate, Operator, Predicate, Statement, TableMetas};
use crate::frontend::router::sharding::ValueRange;
use crate::frontend::router::Error;
use crate::rule::ShardingRule;

pub struct WhereConditions<'a> {
    rule: &'a ShardingRule,
    metas: &'a TableMetas,
}

impl<'a> WhereConditions<'a> {
    pub fn new(rule: &'a ShardingRule, metas: &'a TableMetas) -> Self {
        Self { rule, metas }
    }

    /// One condition per OR branch of the WHERE clause, followed by
    /// conditions from subqueries not already present.
    pub fn conditions(
        &self,
        statement: &Statement,
        params: &[Datum],
    ) -> Result<Vec<ShardingCondition>, Error> {
        let filter = match statement.where_clause() {
            Some(filter) => filter,
            None => return Ok(vec![]),
        };
        let tables = statement.tables();

        let mut result = self.from_predicates(filter, &tables, params)?;

        if let Statement::Select(select) = statement {
            for subquery in &select.subqueries {
                let conditions = self.from_predicates(&subquery.filter, &tables, params)?;
                if !conditions.iter().all(|c| result.contains(c)) {
                    result.extend(conditions);
                }
            }
        }

        Ok(result)
    }

    fn from_predicates(
        &self,
        filter: &[AndPredicate],
        tables: &[&str],
        params: &[Datum],
    ) -> Result<Vec<ShardingCondition>, Error> {
        let mut result = vec![];

        for and in filter {
            let values = self.route_values(and, tables, params)?;
            // An OR branch without sharding columns can match rows anywhere.
            if values.is_empty() {
                return Ok(vec![]);
            }
            result.push(condition(values));
        }

        Ok(result)
    }

    fn route_values(
        &self,
        and: &AndPredicate,
        tables: &[&str],
        params: &[Datum],
    ) -> Result<IndexMap<(String, String), Vec<RouteValue>>, Error> {
        let mut result: IndexMap<(String, String), Vec<RouteValue>> = IndexMap::new();

        for predicate in &and.predicates {
            let table = match self.owner(predicate, tables) {
                Some(table) => table,
                None => continue,
            };

            if !self.rule.is_sharding_column(&predicate.column, table) {
                continue;
            }

            if let Some(value) = route_value(predicate, table, params)? {
                result
                    .entry((table.to_lowercase(), predicate.column.to_lowercase()))
                    .or_default()
                    .push(value);
            }
        }

        Ok(result)
    }

    // Table the predicate's column belongs to.
    fn owner<'t>(&self, predicate: &'t Predicate, tables: &[&'t str]) -> Option<&'t str> {
        if let Some(ref owner) = predicate.table {
            return Some(
                tables
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(owner))
                    .copied()
                    .unwrap_or(owner.as_str()),
            );
        }

        if tables.len() == 1 {
            return tables.first().copied();
        }

        tables
            .iter()
            .find(|table| self.metas.contains_column(table, &predicate.column))
            .copied()
    }
}

fn route_value(
    predicate: &Predicate,
    table: &str,
    params: &[Datum],
) -> Result<Option<RouteValue>, Error> {
    let column = predicate.column.as_str();

    Ok(match &predicate.operator {
        Operator::Eq { value } => value
            .value(params)?
            .map(|value| RouteValue::list(table, column, vec![value])),

        Operator::In { values } => {
            let mut list = vec![];
            for value in values {
                match value.value(params)? {
                    Some(value) => list.push(value),
                    None => return Ok(None),
                }
            }
            Some(RouteValue::list(table, column, list))
        }

        Operator::Between { low, high } => match (low.value(params)?, high.value(params)?) {
            (Some(low), Some(high)) => {
                Some(RouteValue::range(table, column, ValueRange::closed(low, high)))
            }
            _ => None,
        },
    })
}

fn condition(values: IndexMap<(String, String), Vec<RouteValue>>) -> ShardingCondition {
    let mut route_values = vec![];

    for (_, values) in values {
        match merge(values) {
            Some(value) => route_values.push(value),
            None => {
                trace!("sharding condition is always false");
                return ShardingCondition::always_false();
            }
        }
    }

    ShardingCondition::new(route_values)
}

/// AND together all route values for one column.
/// Returns `None` if no value can satisfy all of them.
fn merge(values: Vec<RouteValue>) -> Option<RouteValue> {
    let (table, column) = values
        .first()
        .map(|v| (v.table().to_string(), v.column().to_string()))?;

    let mut list: Option<Vec<ShardingValue>> = None;
    let mut range: Option<ValueRange> = None;

    for value in values {
        match value {
            RouteValue::List(value) => {
                let merged: Vec<ShardingValue> = match list {
                    None => dedup(value.values),
                    Some(previous) => previous
                        .into_iter()
                        .filter(|v| value.values.contains(v))
                        .collect(),
                };
                if merged.is_empty() {
                    return None;
                }
                list = Some(merged);
            }

            RouteValue::Range(value) => {
                range = Some(match range {
                    None => value.range,
                    Some(previous) => previous.intersection(&value.range)?,
                });
            }
        }
    }

    match (list, range) {
        (Some(list), Some(range)) => {
            let list: Vec<_> = list.into_iter().filter(|v| range.contains(v)).collect();
            if list.is_empty() {
                None
            } else {
                Some(RouteValue::list(&table, &column, list))
            }
        }
        (Some(list), None) => Some(RouteValue::list(&table, &column, list)),
        (None, Some(range)) => Some(RouteValue::range(&table, &column, range)),
        (None, None) => None,
    }
}

fn dedup(values: Vec<ShardingValue>) -> Vec<ShardingValue> {
    let mut result = Vec::with_capacity(values.len());
    for value in values {
        if !result.contains(&value) {
            result.push(value);
        }
    }
    result
}
