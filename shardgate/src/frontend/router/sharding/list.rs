use fnv::FnvHashMap as HashMap;
use shardgate_config::{Algorithm, ShardedMappingKind};
use shardgate_types::ShardingValue;

use super::{Error, PreciseShardingValue, RangeShardingValue, ShardingAlgorithm};

/// Explicit value lists mapped to targets.
#[derive(Debug, Clone)]
pub struct List {
    mapping: HashMap<ShardingValue, String>,
}

impl List {
    pub fn new(config: &Algorithm) -> Result<Self, Error> {
        let mut mapping = HashMap::default();

        for map in config
            .mappings
            .iter()
            .filter(|m| m.kind == ShardedMappingKind::List)
        {
            for value in &map.values {
                if let Some(existing) = mapping.insert(value.clone(), map.target.clone()) {
                    if existing != map.target {
                        return Err(Error::Mapping(format!(
                            "value \"{}\" is mapped to both \"{}\" and \"{}\"",
                            value, existing, map.target
                        )));
                    }
                }
            }
        }

        if mapping.is_empty() {
            return Err(Error::Mapping("LIST algorithm has no values".into()));
        }

        Ok(Self { mapping })
    }
}

impl ShardingAlgorithm for List {
    fn precise(
        &self,
        targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> Result<Option<String>, Error> {
        Ok(self
            .mapping
            .get(value.value)
            .and_then(|target| targets.iter().find(|t| t.eq_ignore_ascii_case(target)))
            .cloned())
    }

    fn range(
        &self,
        targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> Result<Vec<String>, Error> {
        Ok(targets
            .iter()
            .filter(|target| {
                self.mapping.iter().any(|(listed, mapped)| {
                    mapped.eq_ignore_ascii_case(target) && value.range.contains(listed)
                })
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod test {
    use shardgate_config::ShardedMapping;

    use super::*;
    use crate::frontend::router::sharding::{test::targets, ValueRange};

    fn algorithm() -> List {
        List::new(&Algorithm::new("LIST").with_mappings(vec![
            ShardedMapping::list(["us".into(), "ca".into()], "ds_0"),
            ShardedMapping::list(["de".into(), "fr".into()], "ds_1"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_precise() {
        let targets = targets("ds_", 2);
        let algorithm = algorithm();
        let shard = |value: &str| {
            let value = ShardingValue::from(value);
            algorithm
                .precise(
                    &targets,
                    &PreciseShardingValue {
                        table: "t_user",
                        column: "country",
                        value: &value,
                    },
                )
                .unwrap()
        };

        assert_eq!(shard("ca").unwrap(), "ds_0");
        assert_eq!(shard("fr").unwrap(), "ds_1");
        assert!(shard("jp").is_none());
    }

    #[test]
    fn test_range() {
        let range = ValueRange::closed("d".into(), "e".into());
        let result = algorithm()
            .range(
                &targets("ds_", 2),
                &RangeShardingValue {
                    table: "t_user",
                    column: "country",
                    range: &range,
                },
            )
            .unwrap();
        assert_eq!(result, vec!["ds_1"]);
    }

    #[test]
    fn test_conflicting_values() {
        let err = List::new(&Algorithm::new("LIST").with_mappings(vec![
            ShardedMapping::list(["us".into()], "ds_0"),
            ShardedMapping::list(["us".into()], "ds_1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
    }
}
