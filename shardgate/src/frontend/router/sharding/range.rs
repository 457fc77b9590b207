use shardgate_config::{Algorithm, ShardedMappingKind};
use shardgate_types::ShardingValue;

use super::{Error, PreciseShardingValue, RangeShardingValue, ShardingAlgorithm, ValueRange};

/// Explicit `[start, end)` ranges mapped to targets.
#[derive(Debug, Clone)]
pub struct Range {
    ranges: Vec<(ValueRange, String)>,
}

impl Range {
    pub fn new(config: &Algorithm) -> Result<Self, Error> {
        let mut ranges = vec![];

        for mapping in config
            .mappings
            .iter()
            .filter(|m| m.kind == ShardedMappingKind::Range)
        {
            if mapping.start.is_none() && mapping.end.is_none() {
                return Err(Error::Mapping(format!(
                    "range for \"{}\" has neither start nor end",
                    mapping.target
                )));
            }

            let range = ValueRange::closed_open(mapping.start.clone(), mapping.end.clone());
            if range.is_empty() {
                return Err(Error::Mapping(format!(
                    "range for \"{}\" is empty",
                    mapping.target
                )));
            }

            ranges.push((range, mapping.target.clone()));
        }

        if ranges.is_empty() {
            return Err(Error::Mapping("RANGE algorithm has no range mappings".into()));
        }

        Ok(Self { ranges })
    }

    fn find(&self, value: &ShardingValue) -> Option<&str> {
        self.ranges
            .iter()
            .find(|(range, _)| range.contains(value))
            .map(|(_, target)| target.as_str())
    }
}

impl ShardingAlgorithm for Range {
    fn precise(
        &self,
        targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> Result<Option<String>, Error> {
        Ok(self
            .find(value.value)
            .and_then(|target| targets.iter().find(|t| t.eq_ignore_ascii_case(target)))
            .cloned())
    }

    fn range(
        &self,
        targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> Result<Vec<String>, Error> {
        let mut result: Vec<String> = vec![];

        for (range, target) in &self.ranges {
            if range.intersection(value.range).is_some()
                && targets.iter().any(|t| t.eq_ignore_ascii_case(target))
                && !result.contains(target)
            {
                result.push(target.clone());
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use shardgate_config::ShardedMapping;

    use super::*;
    use crate::frontend::router::sharding::test::targets;

    fn algorithm() -> Range {
        Range::new(&Algorithm::new("RANGE").with_mappings(vec![
            ShardedMapping::range(None, Some(100_i64.into()), "ds_0"),
            ShardedMapping::range(Some(100_i64.into()), Some(200_i64.into()), "ds_1"),
            ShardedMapping::range(Some(200_i64.into()), None, "ds_2"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_precise() {
        let targets = targets("ds_", 3);
        let algorithm = algorithm();
        let shard = |value: i64| {
            let value = ShardingValue::Integer(value);
            algorithm
                .precise(
                    &targets,
                    &PreciseShardingValue {
                        table: "t",
                        column: "id",
                        value: &value,
                    },
                )
                .unwrap()
        };

        assert_eq!(shard(-5).unwrap(), "ds_0");
        assert_eq!(shard(100).unwrap(), "ds_1");
        assert_eq!(shard(199).unwrap(), "ds_1");
        assert_eq!(shard(5000).unwrap(), "ds_2");
    }

    #[test]
    fn test_range() {
        let targets = targets("ds_", 3);
        let query = ValueRange::closed(150_i64.into(), 250_i64.into());
        let result = algorithm()
            .range(
                &targets,
                &RangeShardingValue {
                    table: "t",
                    column: "id",
                    range: &query,
                },
            )
            .unwrap();
        assert_eq!(result, vec!["ds_1", "ds_2"]);
    }

    #[test]
    fn test_invalid_mappings() {
        assert!(Range::new(&Algorithm::new("RANGE")).is_err());
        assert!(Range::new(
            &Algorithm::new("RANGE")
                .with_mappings(vec![ShardedMapping::range(None, None, "ds_0")])
        )
        .is_err());
        assert!(Range::new(&Algorithm::new("RANGE").with_mappings(vec![
            ShardedMapping::range(Some(5_i64.into()), Some(5_i64.into()), "ds_0")
        ]))
        .is_err());
    }
}
