//! Process-wide configuration handle.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::info;

pub use shardgate_config::{
    Algorithm, Config, DataSource, Error, General, KeyGenerator, LogFormat, MasterSlaveRule,
    Properties, ShardedMapping, ShardedMappingKind, Sharding, Strategy, TableRule,
};

static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// Current configuration.
pub fn config() -> Arc<Config> {
    CONFIG.load().clone()
}

/// Load the configuration file from disk and make it current.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config = Config::load(path)?;
    set(config)
}

/// Validate and swap in a new configuration.
pub fn set(config: Config) -> Result<Config, Error> {
    config.check()?;
    CONFIG.store(Arc::new(config.clone()));
    info!(
        "config swapped: {} sharded tables, {} data sources",
        config.sharding.tables.len(),
        config.data_sources.len()
    );
    Ok(config)
}
