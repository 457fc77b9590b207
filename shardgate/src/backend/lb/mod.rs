//! Read load balancing across master/slave replicas.

use std::fmt::Debug;

pub mod random;
pub mod round_robin;

pub use random::Random;
pub use round_robin::RoundRobin;

/// Picks the slave a read should go to.
pub trait LoadBalanceAlgorithm: Send + Sync + Debug {
    /// Choose one of `slaves`. Returns `None` if there are none.
    fn data_source(&self, name: &str, master: &str, slaves: &[String]) -> Option<String>;
}
