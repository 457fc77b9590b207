//! Sharding algorithms and strategies.
//!
//! An algorithm maps a value (or a range of values) and the list of
//! candidate targets to the targets that should receive the query.
//! Targets are data source names or physical table names, depending
//! on which dimension the strategy shards.

use std::fmt::Debug;

pub mod error;
pub mod hash;
pub mod list;
pub mod modulo;
pub mod range;
pub mod strategy;
pub mod value;

pub use error::Error;
pub use hash::HashMod;
pub use list::List;
pub use modulo::Mod;
pub use range::Range;
pub use strategy::ShardingStrategy;
pub use value::{HintShardingValue, PreciseShardingValue, RangeShardingValue, ValueRange};

pub trait ShardingAlgorithm: Send + Sync + Debug {
    /// Target receiving a single value, if any.
    fn precise(
        &self,
        targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> Result<Option<String>, Error>;

    /// Targets a range of values can be found on.
    fn range(&self, targets: &[String], value: &RangeShardingValue<'_>)
        -> Result<Vec<String>, Error>;

    /// Targets for values supplied through a hint.
    fn hint(
        &self,
        targets: &[String],
        value: &HintShardingValue<'_>,
    ) -> Result<Vec<String>, Error> {
        let mut result = vec![];

        for sharding_value in value.values {
            let precise = PreciseShardingValue {
                table: value.table,
                column: value.column,
                value: sharding_value,
            };
            if let Some(target) = self.precise(targets, &precise)? {
                if !result.contains(&target) {
                    result.push(target);
                }
            }
        }

        Ok(result)
    }
}

/// Find the target whose numeric suffix equals `suffix`,
/// e.g. `t_order_3` for 3.
pub(crate) fn target_with_suffix(targets: &[String], suffix: u64) -> Option<String> {
    targets
        .iter()
        .find(|target| {
            let digits = target
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .count();
            target[target.len() - digits..].parse::<u64>().ok() == Some(suffix)
        })
        .cloned()
}

/// Number of shards: `sharding.count` if set, otherwise
/// the number of targets.
pub(crate) fn sharding_count(configured: Option<u64>, targets: &[String]) -> Result<u64, Error> {
    match configured.unwrap_or(targets.len() as u64) {
        0 => Err(Error::NoTargets),
        count => Ok(count),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub fn targets(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_target_with_suffix() {
        let targets = targets("t_order_", 12);
        assert_eq!(target_with_suffix(&targets, 1).unwrap(), "t_order_1");
        assert_eq!(target_with_suffix(&targets, 10).unwrap(), "t_order_10");
        assert!(target_with_suffix(&targets, 12).is_none());
        assert!(target_with_suffix(&["plain".to_string()], 0).is_none());
    }
}
