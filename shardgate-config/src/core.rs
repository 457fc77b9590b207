use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{DataSource, Error, General, MasterSlaveRule, Sharding};

/// Contents of `shardgate.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: General,

    #[serde(default)]
    pub sharding: Sharding,

    #[serde(default)]
    pub data_sources: Vec<DataSource>,

    #[serde(default)]
    pub master_slave: Vec<MasterSlaveRule>,
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).map_err(|err| Error::config(source, err))
    }
}

impl Config {
    /// Load configuration from disk or use defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let config: Config = if let Ok(source) = read_to_string(path) {
            let config = source.parse()?;
            info!("loaded \"{}\"", path.display());
            config
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                path.display()
            );
            Config::default()
        };

        config.check()?;

        Ok(config)
    }

    /// Validate the configuration. Any error here is fatal.
    pub fn check(&self) -> Result<(), Error> {
        let mut tables = HashSet::new();

        for table in &self.sharding.tables {
            if table.logic_table.trim().is_empty() {
                return Err(Error::Required("logic_table"));
            }

            if !tables.insert(table.logic_table.to_lowercase()) {
                return Err(Error::DuplicateTable(table.logic_table.clone()));
            }

            if let Some(ref generator) = table.key_generator {
                if generator.column.trim().is_empty() {
                    return Err(Error::Required("key generator column"));
                }
            }
        }

        for group in &self.sharding.binding_tables {
            for table in group {
                if !tables.contains(&table.to_lowercase()) {
                    return Err(Error::UnknownTable {
                        context: "binding table group",
                        table: table.clone(),
                    });
                }
            }
        }

        for table in &self.sharding.broadcast_tables {
            if table.trim().is_empty() {
                return Err(Error::Required("broadcast table name"));
            }
        }

        for rule in &self.master_slave {
            if rule.master.trim().is_empty() {
                return Err(Error::Required("master/slave master"));
            }

            if rule.slaves.is_empty() {
                return Err(Error::NoSlaves(rule.name.clone()));
            }
        }

        if self.data_sources.is_empty() && !self.sharding.tables.is_empty() {
            warn!("sharded tables are configured but no data sources are");
        }

        Ok(())
    }
}
