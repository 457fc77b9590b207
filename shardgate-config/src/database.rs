use serde::{Deserialize, Serialize};

/// A physical data source the middleware can route to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// Name used in data nodes, e.g. `ds_0`.
    pub name: String,
    /// Address of the database instance hosting this data source.
    /// Data sources on the same instance share grants.
    #[serde(default)]
    pub instance: Option<String>,
}

impl DataSource {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            instance: None,
        }
    }
}

/// A logical data source backed by one master and its replicas.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MasterSlaveRule {
    /// Logical name, used in data nodes in place of the physical names.
    pub name: String,
    pub master: String,
    #[serde(default)]
    pub slaves: Vec<String>,
    /// Load balancing algorithm for reads, e.g. `random` or `round_robin`.
    #[serde(default = "MasterSlaveRule::load_balance")]
    pub load_balance: String,
}

impl MasterSlaveRule {
    fn load_balance() -> String {
        "random".into()
    }

    pub fn new(name: impl ToString, master: impl ToString, slaves: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            master: master.to_string(),
            slaves: slaves.iter().map(|s| s.to_string()).collect(),
            load_balance: Self::load_balance(),
        }
    }

    /// Physical data source names covered by this rule.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.master.as_str()).chain(self.slaves.iter().map(|s| s.as_str()))
    }
}
