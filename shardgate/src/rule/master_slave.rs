use std::sync::Arc;

use shardgate_config::MasterSlaveRule as MasterSlaveRuleConfig;

use super::Error;
use crate::backend::lb::LoadBalanceAlgorithm;
use crate::registry::Registry;

/// A logical data source backed by one master and its slaves.
#[derive(Debug, Clone)]
pub struct MasterSlaveRule {
    name: String,
    master: String,
    slaves: Vec<String>,
    load_balancer: Arc<dyn LoadBalanceAlgorithm>,
}

impl MasterSlaveRule {
    pub fn new(config: &MasterSlaveRuleConfig, registry: &Registry) -> Result<Self, Error> {
        Ok(Self {
            name: config.name.clone(),
            master: config.master.clone(),
            slaves: config.slaves.clone(),
            load_balancer: registry.load_balancer(&config.load_balance)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn slaves(&self) -> &[String] {
        &self.slaves
    }

    /// Slave a read should go to.
    pub fn slave(&self) -> Option<String> {
        self.load_balancer
            .data_source(&self.name, &self.master, &self.slaves)
    }

    pub fn contains(&self, data_source: &str) -> bool {
        self.name == data_source
            || self.master == data_source
            || self.slaves.iter().any(|slave| slave == data_source)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_robin_slaves() {
        let mut config = MasterSlaveRuleConfig::new("ms_ds", "master", &["slave_0", "slave_1"]);
        config.load_balance = "round_robin".into();

        let rule = MasterSlaveRule::new(&config, Registry::global()).unwrap();
        assert_eq!(rule.slave().as_deref(), Some("slave_0"));
        assert_eq!(rule.slave().as_deref(), Some("slave_1"));
        assert_eq!(rule.slave().as_deref(), Some("slave_0"));
        assert!(rule.contains("slave_1"));
        assert!(!rule.contains("ds_1"));
    }

    #[test]
    fn test_unknown_load_balancer() {
        let mut config = MasterSlaveRuleConfig::new("ms_ds", "master", &["slave_0"]);
        config.load_balance = "least_connections".into();
        assert!(MasterSlaveRule::new(&config, Registry::global()).is_err());
    }
}
