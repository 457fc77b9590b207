//! Routing for one sharded table and the tables bound to it.

use tracing::trace;

use super::EngineContext;
use crate::frontend::router::condition::{RouteValue, ShardingCondition};
use crate::frontend::router::sharding::ShardingStrategy;
use crate::frontend::router::{Error, RoutingResult, RoutingUnit};
use crate::rule::{DataNode, TableRule};

pub fn route(context: &EngineContext<'_>, logic_table: &str) -> Result<RoutingResult, Error> {
    let statement = context.statement;
    let tables = statement.tables();

    if statement.is_modification() && tables.len() > 1 {
        return Err(Error::MultipleTablesModified(statement.kind()));
    }

    let table_rule = context.rule.table_rule(logic_table)?;
    let data_nodes = StandardEngine {
        context,
        table_rule: table_rule.as_ref(),
    }
    .data_nodes()?;

    // Tables in the statement sharing this table's topology.
    let bound: Vec<&str> = tables
        .iter()
        .filter(|table| !table_rule.is_logic_table(table))
        .filter(|table| context.rule.is_bound(table_rule.logic_table(), table))
        .map(|table| {
            context
                .rule
                .find_table_rule(table)
                .map(|rule| rule.logic_table())
                .unwrap_or(*table)
        })
        .collect();

    let mut result = RoutingResult::new();

    for node in data_nodes {
        let mut unit =
            RoutingUnit::new(&node.data_source).with_table(table_rule.logic_table(), &node.table);

        for table in &bound {
            let actual = context.rule.binding_actual_table(
                &node.data_source,
                table,
                table_rule.logic_table(),
                &node.table,
            )?;
            unit = unit.with_table(table, &actual);
        }

        result.push(unit);
    }

    Ok(result)
}

struct StandardEngine<'a> {
    context: &'a EngineContext<'a>,
    table_rule: &'a TableRule,
}

impl StandardEngine<'_> {
    fn database_strategy(&self) -> &ShardingStrategy {
        self.context.rule.database_strategy(self.table_rule)
    }

    fn table_strategy(&self) -> &ShardingStrategy {
        self.context.rule.table_strategy(self.table_rule)
    }

    fn data_nodes(&self) -> Result<Vec<DataNode>, Error> {
        let by_hint = self.database_strategy().is_hint() && self.table_strategy().is_hint();

        // Conditions that can match rows. Without any, every node
        // matching the hints (if any) is a candidate.
        let conditions: Vec<Option<&ShardingCondition>> = if by_hint {
            vec![None]
        } else {
            let conditions: Vec<_> = self
                .context
                .conditions
                .conditions()
                .iter()
                .filter(|condition| !condition.is_always_false())
                .map(Some)
                .collect();
            if conditions.is_empty() {
                vec![None]
            } else {
                conditions
            }
        };

        let mut result: Vec<DataNode> = vec![];

        for condition in conditions {
            let database_values = self.values(self.database_strategy(), condition, true);
            let table_values = self.values(self.table_strategy(), condition, false);

            for node in self.route(&database_values, &table_values)? {
                if !result.contains(&node) {
                    result.push(node);
                }
            }
        }

        trace!(
            "{} routed to {} data nodes",
            self.table_rule.logic_table(),
            result.len()
        );

        Ok(result)
    }

    // Values a strategy shards on: hinted for hint strategies,
    // otherwise taken from the condition.
    fn values(
        &self,
        strategy: &ShardingStrategy,
        condition: Option<&ShardingCondition>,
        database: bool,
    ) -> Vec<RouteValue> {
        let logic_table = self.table_rule.logic_table();

        if strategy.is_hint() {
            let values = match self.context.hint {
                Some(hint) if database => hint.database_sharding_values(logic_table),
                Some(hint) => hint.table_sharding_values(logic_table),
                None => &[],
            };
            return if values.is_empty() {
                vec![]
            } else {
                vec![RouteValue::list(logic_table, "", values.to_vec())]
            };
        }

        let (column, condition) = match (strategy.column(), condition) {
            (Some(column), Some(condition)) => (column, condition),
            _ => return vec![],
        };

        condition
            .route_values
            .iter()
            .filter(|value| value.column().eq_ignore_ascii_case(column))
            .filter(|value| self.context.rule.is_bound(logic_table, value.table()))
            .cloned()
            .collect()
    }

    fn route(
        &self,
        database_values: &[RouteValue],
        table_values: &[RouteValue],
    ) -> Result<Vec<DataNode>, Error> {
        let logic_table = self.table_rule.logic_table();
        let data_sources = self.table_rule.data_source_names();

        let data_sources = if database_values.is_empty() {
            data_sources
        } else {
            self.database_strategy()
                .do_sharding(&data_sources, database_values)?
        };

        if data_sources.is_empty() {
            return Err(Error::NoDatabaseRoute(logic_table.to_string()));
        }

        let mut result = vec![];

        for data_source in data_sources {
            let tables = self.table_rule.actual_table_names(&data_source);
            let tables = if table_values.is_empty() {
                tables
            } else {
                self.table_strategy().do_sharding(&tables, table_values)?
            };

            if tables.is_empty() {
                return Err(Error::NoTableRoute {
                    table: logic_table.to_string(),
                    data_source,
                });
            }

            result.extend(
                tables
                    .iter()
                    .map(|table| DataNode::new(&data_source, table)),
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use shardgate_types::ShardingValue;

    use super::*;
    use crate::frontend::router::condition::ShardingConditions;
    use crate::frontend::router::engine::test::{unit, units};
    use crate::frontend::router::parser::{Select, Statement, Tables, Update};
    use crate::frontend::router::HintManager;
    use crate::rule::test::sharding_rule;
    use crate::rule::ShardingRule;

    fn select(tables: &[&str]) -> Statement {
        Statement::Select(Select {
            tables: tables.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        })
    }

    fn condition(values: &[(&str, &str, i64)]) -> ShardingCondition {
        ShardingCondition::new(
            values
                .iter()
                .map(|(table, column, value)| {
                    RouteValue::list(table, column, vec![ShardingValue::Integer(*value)])
                })
                .collect(),
        )
    }

    fn run(
        rule: &ShardingRule,
        statement: &Statement,
        conditions: Vec<ShardingCondition>,
        hint: Option<&HintManager>,
        table: &str,
    ) -> Result<RoutingResult, Error> {
        let conditions = ShardingConditions::new(conditions);
        let context = EngineContext {
            rule,
            statement,
            conditions: &conditions,
            hint,
        };
        route(&context, table)
    }

    #[test]
    fn test_precise() {
        let rule = sharding_rule();
        let result = run(
            &rule,
            &select(&["t_order"]),
            vec![condition(&[("t_order", "user_id", 1), ("t_order", "order_id", 2)])],
            None,
            "t_order",
        )
        .unwrap();

        assert_eq!(units(&result), vec![unit("ds_1", &["t_order_0"])]);
    }

    #[test]
    fn test_no_conditions_routes_everywhere() {
        let rule = sharding_rule();
        let result = run(&rule, &select(&["t_order"]), vec![], None, "t_order").unwrap();
        assert_eq!(result.len(), 4);

        // Only the data source is known.
        let result = run(
            &rule,
            &select(&["t_order"]),
            vec![condition(&[("t_order", "user_id", 2)])],
            None,
            "t_order",
        )
        .unwrap();
        assert_eq!(
            units(&result),
            vec![unit("ds_0", &["t_order_0"]), unit("ds_0", &["t_order_1"])]
        );
    }

    #[test]
    fn test_multiple_conditions() {
        let rule = sharding_rule();
        let result = run(
            &rule,
            &select(&["t_order"]),
            vec![
                condition(&[("t_order", "user_id", 1), ("t_order", "order_id", 1)]),
                condition(&[("t_order", "user_id", 2), ("t_order", "order_id", 2)]),
                condition(&[("t_order", "user_id", 3), ("t_order", "order_id", 5)]),
                ShardingCondition::always_false(),
            ],
            None,
            "t_order",
        )
        .unwrap();

        assert_eq!(
            units(&result),
            vec![unit("ds_1", &["t_order_1"]), unit("ds_0", &["t_order_0"])]
        );
    }

    #[test]
    fn test_binding_tables() {
        let rule = sharding_rule();
        let statement = select(&["t_order", "t_order_item"]);

        // Condition on the bound table routes the representative table.
        let result = run(
            &rule,
            &statement,
            vec![condition(&[
                ("t_order_item", "user_id", 1),
                ("t_order_item", "order_id", 3),
            ])],
            None,
            "t_order",
        )
        .unwrap();
        assert_eq!(
            units(&result),
            vec![unit("ds_1", &["t_order_1", "t_order_item_1"])]
        );

        // Same answer as routing the single table.
        let single = run(
            &rule,
            &select(&["t_order"]),
            vec![condition(&[("t_order", "user_id", 1), ("t_order", "order_id", 3)])],
            None,
            "t_order",
        )
        .unwrap();
        let unit = single.iter().next().unwrap();
        let bound = result.iter().next().unwrap();
        assert_eq!(unit.data_source, bound.data_source);
        assert_eq!(unit.table_units[0], bound.table_units[0]);
    }

    #[test]
    fn test_modify_multiple_tables() {
        let rule = sharding_rule();
        let statement = Statement::Update(Update {
            tables: vec!["t_order".into(), "t_order_item".into()],
            ..Default::default()
        });
        assert!(matches!(
            run(&rule, &statement, vec![], None, "t_order"),
            Err(Error::MultipleTablesModified("UPDATE"))
        ));
    }

    #[test]
    fn test_hint_routing() {
        let rule = sharding_rule();
        let statement = select(&["t_hint"]);

        let mut hint = HintManager::default();
        hint.add_database_sharding_value("t_hint", 1_i64)
            .add_table_sharding_value("t_hint", 4_i64);

        // Conditions are ignored when both dimensions are hinted.
        let result = run(
            &rule,
            &statement,
            vec![condition(&[("t_hint", "id", 1)])],
            Some(&hint),
            "t_hint",
        )
        .unwrap();
        assert_eq!(units(&result), vec![unit("ds_1", &["t_hint_0"])]);

        // No hint: everywhere.
        let result = run(&rule, &statement, vec![], None, "t_hint").unwrap();
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_database_only_hint() {
        let rule = sharding_rule();
        let mut hint = HintManager::default();
        hint.set_database_sharding_value(0_i64);

        let result = run(&rule, &select(&["t_hint"]), vec![], Some(&hint), "t_hint").unwrap();
        assert_eq!(
            units(&result),
            vec![unit("ds_0", &["t_hint_0"]), unit("ds_0", &["t_hint_1"])]
        );
    }

    #[test]
    fn test_fallback_rule() {
        let rule = sharding_rule();
        let statement = Statement::Ddl(Tables {
            tables: vec!["t_user".into()],
        });
        let result = run(&rule, &statement, vec![], None, "t_user").unwrap();
        assert_eq!(units(&result), vec![unit("ds_0", &["t_user"])]);
    }
}
