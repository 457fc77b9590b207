use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shardgate_types::Datum;
use thiserror::Error;
use tracing::info;

use crate::config::{self, Config};
use crate::frontend::router::{self, Router, RouterContext, Statement, TableMetas};
use crate::rule::{self, ShardingRule};

/// Shardgate routes statements across sharded data sources.
#[derive(Parser, Debug)]
#[command(name = "", version = concat!("Shardgate v", env!("CARGO_PKG_VERSION")))]
pub struct Cli {
    /// Path to the configuration file. Default: "shardgate.toml"
    #[arg(short, long, default_value = "shardgate.toml")]
    pub config: PathBuf,
    /// Subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check the configuration file for errors.
    Configcheck,

    /// Route a statement and print the result.
    Route {
        /// Statement, as JSON.
        #[arg(short, long)]
        statement: String,

        /// Bound parameters, as a JSON array.
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Generate keys for a table.
    Keygen {
        /// Logic table. Uses the default key generator if not set.
        #[arg(short, long)]
        table: Option<String>,

        /// Number of keys to generate.
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] config::Error),

    #[error("{0}")]
    Rule(#[from] rule::Error),

    #[error("{0}")]
    Router(#[from] router::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validate the configuration and build the sharding rule from it.
pub fn config_check(config: &Config) -> Result<ShardingRule, Error> {
    config.check()?;
    let rule = ShardingRule::new(config)?;

    info!(
        "configuration is valid: {} table rules, {} data sources",
        rule.table_rules().len(),
        rule.data_source_names().len()
    );

    Ok(rule)
}

/// Route a JSON statement, returning the route result as JSON.
pub fn route(config: &Config, statement: &str, params: Option<&str>) -> Result<String, Error> {
    let statement: Statement = serde_json::from_str(statement)?;
    let params: Vec<Datum> = match params {
        Some(params) => serde_json::from_str(params)?,
        None => vec![],
    };

    let router = Router::from_config(config, TableMetas::default())?;
    let mut context = RouterContext::new();
    let result = router.route(&statement, &params, &mut context)?;

    Ok(serde_json::to_string_pretty(&result)?)
}

/// Generate `count` keys.
pub fn keygen(
    config: &Config,
    table: Option<&str>,
    count: usize,
) -> Result<Vec<String>, Error> {
    let sharding_rule = ShardingRule::new(config)?;

    (0..count)
        .map(|_| -> Result<String, Error> {
            let key = match table {
                Some(table) => sharding_rule.generate_key(table)?,
                None => sharding_rule
                    .default_key_generator()
                    .generate_key()
                    .map_err(rule::Error::from)?,
            };
            Ok(key.to_string())
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rule::test::sharding_config;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from([
            "shardgate",
            "--config",
            "/etc/shardgate.toml",
            "keygen",
            "--table",
            "t_order",
            "-n",
            "3",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/shardgate.toml"));
        match cli.command {
            Commands::Keygen { table, count } => {
                assert_eq!(table.as_deref(), Some("t_order"));
                assert_eq!(count, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_check() {
        let rule = config_check(&sharding_config()).unwrap();
        assert!(rule.find_table_rule("t_order").is_some());
    }

    #[test]
    fn test_route() {
        let statement = r#"{
            "type": "select",
            "tables": ["t_order"],
            "where": [[
                {"table": "t_order", "column": "user_id", "op": "eq", "value": {"literal": 1}},
                {"table": "t_order", "column": "order_id", "op": "eq", "value": {"param": 0}}
            ]]
        }"#;
        let output = route(&sharding_config(), statement, Some(r#"[{"bigint": 2}]"#)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let units = json["routing_result"].as_array().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0]["data_source"], "ds_1");
        assert_eq!(units[0]["table_units"][0]["actual_table"], "t_order_0");
    }

    #[test]
    fn test_keygen() {
        let keys = keygen(&sharding_config(), Some("t_order"), 3).unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.parse::<i64>().is_ok()));

        assert!(keygen(&sharding_config(), Some("t_config"), 1).is_err());
    }
}
