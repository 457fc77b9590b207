//! Pluggable algorithms, resolved by type name.
//!
//! Sharding algorithms, key generators and load balancers are
//! registered under a type string (e.g. `MOD`, `SNOWFLAKE`, `RANDOM`)
//! and resolved once, when the sharding rule is built.

use std::sync::Arc;

use fnv::FnvHashMap as HashMap;
use once_cell::sync::Lazy;
use shardgate_config::{util::normalize_type, Algorithm, Properties};
use thiserror::Error;

use crate::backend::lb::{LoadBalanceAlgorithm, Random, RoundRobin};
use crate::frontend::router::sharding::{self, HashMod, List, Mod, Range, ShardingAlgorithm};
use crate::unique_id::{self, KeyGenerator, Snowflake, UuidKey};

pub type AlgorithmFactory =
    fn(&Algorithm) -> Result<Arc<dyn ShardingAlgorithm>, sharding::Error>;
pub type KeyGeneratorFactory =
    fn(&Properties) -> Result<Arc<dyn KeyGenerator>, unique_id::Error>;
pub type LoadBalanceFactory = fn() -> Arc<dyn LoadBalanceAlgorithm>;

/// Key generator used when nothing is configured.
pub const DEFAULT_KEY_GENERATOR: &str = "SNOWFLAKE";

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::default);

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown {what} type \"{kind}\"")]
    Unknown { what: &'static str, kind: String },

    #[error("{0}")]
    Sharding(#[from] sharding::Error),

    #[error("{0}")]
    KeyGenerator(#[from] unique_id::Error),
}

#[derive(Debug, Clone)]
pub struct Registry {
    algorithms: HashMap<String, AlgorithmFactory>,
    key_generators: HashMap<String, KeyGeneratorFactory>,
    load_balancers: HashMap<String, LoadBalanceFactory>,
}

impl Default for Registry {
    /// Registry with the built-in types.
    fn default() -> Self {
        let mut registry = Self::empty();

        registry
            .register_algorithm("MOD", |config| Ok(Arc::new(Mod::new(config)?)))
            .register_algorithm("HASH_MOD", |config| Ok(Arc::new(HashMod::new(config)?)))
            .register_algorithm("RANGE", |config| Ok(Arc::new(Range::new(config)?)))
            .register_algorithm("LIST", |config| Ok(Arc::new(List::new(config)?)))
            .register_key_generator("SNOWFLAKE", |props| Ok(Arc::new(Snowflake::new(props)?)))
            .register_key_generator("UUID", |_| Ok(Arc::new(UuidKey)))
            .register_load_balancer("RANDOM", || Arc::new(Random))
            .register_load_balancer("ROUND_ROBIN", || Arc::new(RoundRobin::default()));

        registry
    }
}

impl Registry {
    /// Registry with the built-in types, shared by the whole process.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    pub fn empty() -> Self {
        Self {
            algorithms: HashMap::default(),
            key_generators: HashMap::default(),
            load_balancers: HashMap::default(),
        }
    }

    pub fn register_algorithm(&mut self, kind: &str, factory: AlgorithmFactory) -> &mut Self {
        self.algorithms.insert(normalize_type(kind), factory);
        self
    }

    pub fn register_key_generator(
        &mut self,
        kind: &str,
        factory: KeyGeneratorFactory,
    ) -> &mut Self {
        self.key_generators.insert(normalize_type(kind), factory);
        self
    }

    pub fn register_load_balancer(&mut self, kind: &str, factory: LoadBalanceFactory) -> &mut Self {
        self.load_balancers.insert(normalize_type(kind), factory);
        self
    }

    pub fn algorithm(&self, config: &Algorithm) -> Result<Arc<dyn ShardingAlgorithm>, Error> {
        let factory = self
            .algorithms
            .get(&normalize_type(&config.kind))
            .ok_or_else(|| Error::Unknown {
                what: "sharding algorithm",
                kind: config.kind.clone(),
            })?;
        Ok(factory(config)?)
    }

    pub fn key_generator(
        &self,
        kind: &str,
        props: &Properties,
    ) -> Result<Arc<dyn KeyGenerator>, Error> {
        let factory = self
            .key_generators
            .get(&normalize_type(kind))
            .ok_or_else(|| Error::Unknown {
                what: "key generator",
                kind: kind.to_string(),
            })?;
        Ok(factory(props)?)
    }

    pub fn load_balancer(&self, kind: &str) -> Result<Arc<dyn LoadBalanceAlgorithm>, Error> {
        let factory = self
            .load_balancers
            .get(&normalize_type(kind))
            .ok_or_else(|| Error::Unknown {
                what: "load balance algorithm",
                kind: kind.to_string(),
            })?;
        Ok(factory())
    }
}
