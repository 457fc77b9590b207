use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use shardgate::backend::execute::{
    self, group, ExecuteCallback, ExecuteContext, ExecuteEngine, ExecutionUnit,
};
use shardgate::backend::merge::{prepare, IteratorMergedResult, MemoryQueryResult, QueryResult};
use shardgate::config::{self, Config};
use shardgate::frontend::router::parser::{
    AndPredicate, Assignment, Expr, Insert, Predicate, Select, Update,
};
use shardgate::frontend::router::{Error, Router, RouterContext, Statement, TableMetas};
use shardgate::Datum;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[general]
max_connections_per_query = 1

[[data_sources]]
name = "ds_0"

[[data_sources]]
name = "ds_0_replica"

[[data_sources]]
name = "ds_1"

[[data_sources]]
name = "ds_1_replica"

[[master_slave]]
name = "ms_0"
master = "ds_0"
slaves = ["ds_0_replica"]

[[master_slave]]
name = "ms_1"
master = "ds_1"
slaves = ["ds_1_replica"]
load_balance = "ROUND_ROBIN"

[sharding]
binding_tables = [["t_order", "t_order_item"]]
broadcast_tables = ["t_config"]

[[sharding.tables]]
logic_table = "t_order"
actual_data_nodes = "ms_${0..1}.t_order_${0..1}"
database_strategy = { type = "standard", column = "user_id", algorithm = { type = "MOD" } }
table_strategy = { type = "standard", column = "order_id", algorithm = { type = "MOD" } }
key_generator = { type = "SNOWFLAKE", column = "order_id", props = { "worker.id" = 7 } }

[[sharding.tables]]
logic_table = "t_order_item"
actual_data_nodes = "ms_${0..1}.t_order_item_${0..1}"
database_strategy = { type = "standard", column = "user_id", algorithm = { type = "MOD" } }
table_strategy = { type = "standard", column = "order_id", algorithm = { type = "MOD" } }
"#;

fn load() -> Config {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    config::load(file.path()).unwrap()
}

fn router() -> Router {
    Router::from_config(&load(), TableMetas::default()).unwrap()
}

fn select_order(user_id: Expr) -> Statement {
    Statement::Select(Select {
        tables: vec!["t_order".into(), "t_order_item".into()],
        filter: vec![AndPredicate::new(vec![Predicate::eq(
            Some("t_order"),
            "user_id",
            user_id,
        )])],
        ..Default::default()
    })
}

#[test]
fn test_load_config() {
    let config = load();
    assert_eq!(config.general.max_connections_per_query, 1);
    assert_eq!(config.sharding.tables.len(), 2);
    assert_eq!(config::config().sharding.tables.len(), 2);
}

#[test]
fn test_insert_generates_keys() {
    let router = router();
    let mut context = RouterContext::new();

    let insert = Statement::Insert(Insert {
        table: "t_order".into(),
        columns: Some(vec!["user_id".into(), "status".into()]),
        values: vec![
            vec![Expr::Param(0), Expr::from("new")],
            vec![Expr::Param(1), Expr::from("new")],
        ],
        ..Default::default()
    });

    let result = router
        .route(&insert, &[Datum::Bigint(1), Datum::Bigint(2)], &mut context)
        .unwrap();

    let key = result.generated_key().unwrap();
    assert_eq!(key.column, "order_id");
    assert_eq!(result.generated_values().len(), 2);

    let mut data_sources = result.routing_result().data_source_names();
    data_sources.sort();
    assert_eq!(data_sources, vec!["ds_0", "ds_1"]);
    assert!(context.is_master_visited());

    // Second batch in the same unit of work.
    let result = router
        .route(&insert, &[Datum::Bigint(3), Datum::Bigint(5)], &mut context)
        .unwrap();
    assert_eq!(result.generated_values().len(), 4);
    assert_eq!(result.routing_result().data_source_names(), vec!["ds_1"]);
}

#[test]
fn test_read_write_splitting() {
    let router = router();
    let mut context = RouterContext::new();

    let result = router
        .route(&select_order(Expr::Param(0)), &[Datum::Bigint(4)], &mut context)
        .unwrap();
    assert_eq!(
        result.routing_result().data_source_names(),
        vec!["ds_0_replica"]
    );
    for unit in result.routing_result() {
        assert_eq!(unit.logic_data_source, "ms_0");
        assert_eq!(unit.table_units.len(), 2);
    }

    let update = Statement::Update(Update {
        tables: vec!["t_order".into()],
        assignments: vec![Assignment {
            column: "status".into(),
            value: Expr::from("shipped"),
        }],
        filter: vec![AndPredicate::new(vec![Predicate::eq(
            None,
            "user_id",
            4_i64.into(),
        )])],
    });
    let result = router.route(&update, &[], &mut context).unwrap();
    assert_eq!(result.routing_result().data_source_names(), vec!["ds_0"]);

    // Reads in the same unit of work follow the write.
    let result = router
        .route(&select_order(4_i64.into()), &[], &mut context)
        .unwrap();
    assert_eq!(result.routing_result().data_source_names(), vec!["ds_0"]);

    context.clear();
    let result = router
        .route(&select_order(4_i64.into()), &[], &mut context)
        .unwrap();
    assert_eq!(
        result.routing_result().data_source_names(),
        vec!["ds_0_replica"]
    );
}

#[test]
fn test_sharding_key_update_rejected() {
    let router = router();
    let mut context = RouterContext::new();

    let update = Statement::Update(Update {
        tables: vec!["t_order".into()],
        assignments: vec![Assignment {
            column: "user_id".into(),
            value: 2_i64.into(),
        }],
        filter: vec![AndPredicate::new(vec![Predicate::eq(
            None,
            "user_id",
            1_i64.into(),
        )])],
    });

    let err = router.route(&update, &[], &mut context).unwrap_err();
    assert!(matches!(err, Error::ShardingKeyUpdate { .. }));
}

/// Tables ending in `_1` hold one row, the others are empty.
struct FakeBackend;

#[async_trait]
impl ExecuteCallback<ExecutionUnit, Box<dyn QueryResult>> for FakeBackend {
    async fn execute(
        &self,
        inputs: Vec<ExecutionUnit>,
        _is_first: bool,
        _context: &ExecuteContext,
    ) -> Result<Vec<Box<dyn QueryResult>>, execute::Error> {
        inputs
            .into_iter()
            .map(|unit| -> Result<Box<dyn QueryResult>, execute::Error> {
                let table = unit
                    .routing_unit
                    .actual_table("t_order")
                    .ok_or_else(|| execute::Error::statement(unit.data_source(), "no table"))?;
                let rows = match table.strip_suffix("_1") {
                    Some(_) => vec![vec![
                        Datum::Text(unit.data_source().to_string()),
                        Datum::Text(table.to_string()),
                    ]],
                    None => vec![],
                };
                let result: Box<dyn QueryResult> = Box::new(MemoryQueryResult::new(
                    vec!["data_source".into(), "table".into()],
                    rows,
                ));
                Ok(result)
            })
            .collect()
    }
}

#[tokio::test]
async fn test_route_execute_merge() {
    let config = load();
    let router = Router::from_config(&config, TableMetas::default()).unwrap();
    let mut context = RouterContext::new();

    let statement = Statement::Select(Select {
        tables: vec!["t_order".into()],
        ..Default::default()
    });
    let result = router.route(&statement, &[], &mut context).unwrap();
    assert_eq!(result.routing_result().len(), 4);

    let units = ExecutionUnit::from_routing(
        result.routing_result(),
        "SELECT data_source, table FROM t_order",
        &[],
    );
    let groups = group(units, config.general.max_connections_per_query);
    assert_eq!(groups.len(), 2);
    let modes: Vec<_> = groups.iter().map(|g| g.mode).collect();

    let engine = ExecuteEngine::new(2).unwrap();
    let results = engine
        .execute(groups, Arc::new(FakeBackend), ExecuteContext::default(), false)
        .await
        .unwrap();
    assert_eq!(results.len(), 4);

    // Two units per group, in group order.
    let results = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| prepare(result, modes[i / 2]))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let mut merged = IteratorMergedResult::new(results).unwrap();
    let mut rows = vec![];
    while merged.next().unwrap() {
        rows.push(merged.value(1).unwrap().to_string());
    }
    assert_eq!(rows, vec!["t_order_1", "t_order_1"]);
    assert!(!merged.next().unwrap());
}
