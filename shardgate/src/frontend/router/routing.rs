//! Sharding router: conditions, keys, engine, result.

use shardgate_types::Datum;
use tracing::debug;

use super::condition::{
    GeneratedKey, InsertConditions, RouteValue, ShardingCondition, ShardingConditions,
    WhereConditions,
};
use super::engine::{EngineContext, RoutingEngine};
use super::parser::{Statement, TableMetas};
use super::route::SqlRouteResultBuilder;
use super::validator::validate;
use super::{Error, HintManager, RouterContext, SqlRouteResult};
use crate::rule::ShardingRule;

pub struct ShardingRouter<'a> {
    rule: &'a ShardingRule,
    metas: &'a TableMetas,
}

impl<'a> ShardingRouter<'a> {
    pub fn new(rule: &'a ShardingRule, metas: &'a TableMetas) -> Self {
        Self { rule, metas }
    }

    pub fn route(
        &self,
        statement: &Statement,
        params: &[Datum],
        context: &mut RouterContext,
    ) -> Result<SqlRouteResult, Error> {
        validate(self.rule, statement, params)?;

        let mut generated_key = match statement {
            Statement::Insert(insert) => GeneratedKey::find(self.rule, self.metas, params, insert)?,
            _ => None,
        };

        let mut conditions = ShardingConditions::new(match statement {
            Statement::Insert(insert) => InsertConditions::new(self.rule, self.metas).conditions(
                insert,
                generated_key.as_mut(),
                params,
            )?,
            _ => WhereConditions::new(self.rule, self.metas).conditions(statement, params)?,
        });

        let need_merge = self.need_merge(statement);
        if need_merge {
            self.check_subquery(statement, &conditions, context.hint())?;
            conditions.merge();
        }

        let engine = RoutingEngine::new(self.rule, statement, &conditions);
        debug!("{} routed by {} engine", statement.kind(), engine.name());

        let routing_result = engine.route(&EngineContext {
            rule: self.rule,
            statement,
            conditions: &conditions,
            hint: context.hint(),
        })?;

        if need_merge && !routing_result.is_single() {
            return Err(Error::SubqueryMultipleUnits(routing_result.len()));
        }

        if let Some(ref key) = generated_key {
            if key.generated {
                context.add_generated_values(&key.values);
            }
        }

        Ok(SqlRouteResultBuilder::default()
            .statement(statement.clone())
            .conditions(conditions)
            .generated_key(generated_key)
            .generated_values(context.generated_values().to_vec())
            .routing_result(routing_result)
            .build()?)
    }

    // A SELECT with subqueries over sharded tables must end up
    // on exactly one data node.
    fn need_merge(&self, statement: &Statement) -> bool {
        statement.contains_subquery()
            && !self
                .rule
                .sharding_logic_tables(&statement.tables())
                .is_empty()
    }

    fn check_subquery(
        &self,
        statement: &Statement,
        conditions: &ShardingConditions,
        hint: Option<&HintManager>,
    ) -> Result<(), Error> {
        if self.fully_hinted(statement, hint) {
            return Ok(());
        }

        let (last, rest) = match conditions.conditions().split_last() {
            Some(split) => split,
            None => return Err(Error::SubqueryWithoutShardingColumn),
        };

        if rest.iter().all(|condition| self.same_condition(last, condition)) {
            Ok(())
        } else {
            Err(Error::SubqueryInconsistent)
        }
    }

    // Some table is routed by hint alone, with values for both dimensions.
    fn fully_hinted(&self, statement: &Statement, hint: Option<&HintManager>) -> bool {
        let hint = match hint {
            Some(hint) => hint,
            None => return false,
        };

        statement.tables().iter().any(|table| {
            self.rule.find_table_rule(table).is_some_and(|table_rule| {
                self.rule.database_strategy(table_rule).is_hint()
                    && self.rule.table_strategy(table_rule).is_hint()
                    && !hint.database_sharding_values(table).is_empty()
                    && !hint.table_sharding_values(table).is_empty()
            })
        })
    }

    fn same_condition(&self, left: &ShardingCondition, right: &ShardingCondition) -> bool {
        left.route_values.len() == right.route_values.len()
            && left
                .route_values
                .iter()
                .zip(&right.route_values)
                .all(|(left, right)| self.same_route_value(left, right))
    }

    fn same_route_value(&self, left: &RouteValue, right: &RouteValue) -> bool {
        let same_values = match (left, right) {
            (RouteValue::List(left), RouteValue::List(right)) => left.values == right.values,
            (RouteValue::Range(left), RouteValue::Range(right)) => left.range == right.range,
            _ => false,
        };

        same_values
            && left.column().eq_ignore_ascii_case(right.column())
            && self.rule.is_bound(left.table(), right.table())
    }
}
