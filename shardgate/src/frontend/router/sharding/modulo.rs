use shardgate_config::Algorithm;

use super::{
    sharding_count, target_with_suffix, Error, PreciseShardingValue, RangeShardingValue,
    ShardingAlgorithm,
};

const NAME: &str = "MOD";

/// `value % count`, routed to the target with that numeric suffix.
#[derive(Debug, Clone, Default)]
pub struct Mod {
    count: Option<u64>,
}

impl Mod {
    pub fn new(config: &Algorithm) -> Result<Self, Error> {
        let count = config.props.get_or("sharding.count", 0_u64)?;
        Ok(Self {
            count: (count > 0).then_some(count),
        })
    }

    fn shard(&self, targets: &[String], value: i64) -> Result<Option<String>, Error> {
        let count = sharding_count(self.count, targets)?;
        let suffix = value.rem_euclid(count as i64) as u64;
        Ok(target_with_suffix(targets, suffix))
    }
}

impl ShardingAlgorithm for Mod {
    fn precise(
        &self,
        targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> Result<Option<String>, Error> {
        let integer = value.value.integer().ok_or_else(|| Error::NotInteger {
            algorithm: NAME,
            value: value.value.clone(),
        })?;
        self.shard(targets, integer)
    }

    fn range(
        &self,
        targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> Result<Vec<String>, Error> {
        let count = sharding_count(self.count, targets)?;

        // Narrow ranges only touch some of the shards.
        if let Some((low, high)) = value.range.integer_bounds() {
            if high < low {
                return Ok(vec![]);
            }
            if ((high as i128) - (low as i128)) < count as i128 {
                let mut result = vec![];
                for integer in low..=high {
                    if let Some(target) = self.shard(targets, integer)? {
                        if !result.contains(&target) {
                            result.push(target);
                        }
                    }
                }
                return Ok(result);
            }
        }

        Ok(targets.to_vec())
    }
}
