use sha1::{Digest, Sha1};
use shardgate_config::Algorithm;
use shardgate_types::ShardingValue;

use super::{
    sharding_count, target_with_suffix, Error, PreciseShardingValue, RangeShardingValue,
    ShardingAlgorithm,
};

/// SHA-1 of the value, modulo the number of shards.
///
/// Works for any value type. Ranges can't be narrowed
/// and go to every target.
#[derive(Debug, Clone, Default)]
pub struct HashMod {
    count: Option<u64>,
}

impl HashMod {
    pub fn new(config: &Algorithm) -> Result<Self, Error> {
        let count = config.props.get_or("sharding.count", 0_u64)?;
        Ok(Self {
            count: (count > 0).then_some(count),
        })
    }
}

pub(crate) fn hash(value: &ShardingValue) -> u64 {
    let digest = Sha1::digest(value.to_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

impl ShardingAlgorithm for HashMod {
    fn precise(
        &self,
        targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> Result<Option<String>, Error> {
        let count = sharding_count(self.count, targets)?;
        Ok(target_with_suffix(targets, hash(value.value) % count))
    }

    fn range(
        &self,
        targets: &[String],
        _value: &RangeShardingValue<'_>,
    ) -> Result<Vec<String>, Error> {
        Ok(targets.to_vec())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::frontend::router::sharding::test::targets;

    #[test]
    fn test_stable_and_spread() {
        let targets = targets("ds_", 4);
        let algorithm = HashMod::new(&Algorithm::new("HASH_MOD")).unwrap();
        let mut seen = HashSet::new();

        for i in 0..100_i64 {
            let value = ShardingValue::String(format!("user-{}", i));
            let shard = |value: &ShardingValue| {
                algorithm
                    .precise(
                        &targets,
                        &PreciseShardingValue {
                            table: "t_user",
                            column: "email",
                            value,
                        },
                    )
                    .unwrap()
                    .unwrap()
            };
            let first = shard(&value);
            assert_eq!(first, shard(&value));
            seen.insert(first);
        }

        assert_eq!(seen.len(), 4);
    }
}
