//! Statement router.
//!
//! Routes a parsed statement and its parameters to data sources and
//! physical tables. Sharding comes first, then read/write splitting.

use std::sync::Arc;

use shardgate_types::Datum;
use tracing::info;

pub mod condition;
pub mod context;
pub mod engine;
pub mod error;
pub mod hint;
pub mod master_slave;
pub mod parser;
pub mod route;
pub mod routing;
pub mod sharding;
pub mod validator;

pub use context::RouterContext;
pub use engine::RoutingEngine;
pub use error::Error;
pub use hint::HintManager;
pub use master_slave::MasterSlaveRouter;
pub use parser::{Statement, TableMetas};
pub use route::{RoutingResult, RoutingUnit, SqlRouteResult, TableUnit};
pub use routing::ShardingRouter;

use crate::config::{config, Config};
use crate::rule::ShardingRule;

#[derive(Debug, Clone)]
pub struct Router {
    rule: Arc<ShardingRule>,
    metas: Arc<TableMetas>,
    show_sql: bool,
}

impl Router {
    /// Router over a prebuilt rule, logging statements
    /// if the global config says so.
    pub fn new(rule: Arc<ShardingRule>, metas: Arc<TableMetas>) -> Self {
        Self {
            rule,
            metas,
            show_sql: config().general.show_sql,
        }
    }

    pub fn from_config(config: &Config, metas: TableMetas) -> Result<Self, Error> {
        Ok(Self {
            rule: Arc::new(ShardingRule::new(config)?),
            metas: Arc::new(metas),
            show_sql: config.general.show_sql,
        })
    }

    pub fn rule(&self) -> &ShardingRule {
        &self.rule
    }

    pub fn metas(&self) -> &TableMetas {
        &self.metas
    }

    /// Route a statement within a unit of work.
    pub fn route(
        &self,
        statement: &Statement,
        params: &[Datum],
        context: &mut RouterContext,
    ) -> Result<SqlRouteResult, Error> {
        let result =
            ShardingRouter::new(&self.rule, &self.metas).route(statement, params, context)?;

        let result = if self.rule.master_slave_rules().is_empty() {
            result
        } else {
            let routing_result = MasterSlaveRouter::new(&self.rule).route(
                result.routing_result().clone(),
                statement,
                context,
            )?;
            result.with_routing_result(routing_result)
        };

        if self.show_sql {
            show_sql(&result);
        }

        Ok(result)
    }
}

fn show_sql(result: &SqlRouteResult) {
    let statement = result.statement();
    info!(
        "logic statement: {} {}",
        statement.kind(),
        statement.tables().join(", ")
    );
    for unit in result.routing_result() {
        info!("actual route: {}", unit);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::router::parser::{AndPredicate, Predicate, Select};
    use crate::rule::test::sharding_config;

    #[test]
    fn test_route_select() {
        let router = Router::from_config(&sharding_config(), TableMetas::default()).unwrap();
        let mut context = RouterContext::new();

        let statement = Statement::Select(Select {
            tables: vec!["t_order".into()],
            filter: vec![AndPredicate::new(vec![Predicate::in_list(
                None,
                "user_id",
                vec![1_i64.into(), 3_i64.into()],
            )])],
            ..Default::default()
        });

        let result = router.route(&statement, &[], &mut context).unwrap();
        assert_eq!(result.routing_result().data_source_names(), vec!["ds_1"]);
        assert_eq!(result.routing_result().len(), 2);
    }

    #[test]
    fn test_route_with_master_slave() {
        let mut config = sharding_config();
        config.general.show_sql = true;
        config.data_sources.push(crate::config::DataSource::new("ds_0_replica"));
        config.master_slave.push(crate::config::MasterSlaveRule::new(
            "ds_0",
            "ds_0",
            &["ds_0_replica"],
        ));
        let router = Router::from_config(&config, TableMetas::default()).unwrap();
        let mut context = RouterContext::new();

        let statement = Statement::Select(Select {
            tables: vec!["t_user".into()],
            ..Default::default()
        });
        let result = router.route(&statement, &[], &mut context).unwrap();
        let unit = result.routing_result().iter().next().unwrap();
        assert_eq!(unit.data_source, "ds_0_replica");
        assert_eq!(unit.logic_data_source, "ds_0");
    }
}
