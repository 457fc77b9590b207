//! Sharding conditions from INSERT values.

use shardgate_types::Datum;

use super::generated_key::insert_columns;
use super::{GeneratedKey, RouteValue, ShardingCondition};
use crate::frontend::router::parser::{Insert, TableMetas};
use crate::frontend::router::Error;
use crate::rule::ShardingRule;

pub struct InsertConditions<'a> {
    rule: &'a ShardingRule,
    metas: &'a TableMetas,
}

impl<'a> InsertConditions<'a> {
    pub fn new(rule: &'a ShardingRule, metas: &'a TableMetas) -> Self {
        Self { rule, metas }
    }

    /// One condition per value row. Keys are generated here
    /// when the statement doesn't supply them.
    pub fn conditions(
        &self,
        insert: &Insert,
        generated_key: Option<&mut GeneratedKey>,
        params: &[Datum],
    ) -> Result<Vec<ShardingCondition>, Error> {
        let table = insert.table.as_str();
        let mut columns = insert_columns(self.metas, insert);

        if let Some(ref key) = generated_key {
            if key.generated {
                columns.retain(|c| !c.eq_ignore_ascii_case(&key.column));
            }
        }

        let mut result = vec![];
        for row in &insert.values {
            let mut condition = ShardingCondition::default();
            for (column, expr) in columns.iter().zip(row) {
                if !self.rule.is_sharding_column(column, table) {
                    continue;
                }
                if let Some(value) = expr.value(params)? {
                    condition
                        .route_values
                        .push(RouteValue::list(table, column, vec![value]));
                }
            }
            result.push(condition);
        }

        if let Some(key) = generated_key {
            if key.generated {
                for _ in &insert.values {
                    key.values.push(self.rule.generate_key(table)?);
                }

                if self.rule.is_sharding_column(&key.column, table) {
                    for (condition, value) in result.iter_mut().zip(key.values.iter()) {
                        condition.route_values.push(RouteValue::list(
                            table,
                            &key.column,
                            vec![value.clone()],
                        ));
                    }
                }
            }
        }

        Ok(result)
    }
}
