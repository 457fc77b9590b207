//! Sharding strategies: which column, which algorithm.

use std::sync::Arc;

use shardgate_config::Strategy;

use super::{
    Error, HintShardingValue, PreciseShardingValue, RangeShardingValue, ShardingAlgorithm,
};
use crate::frontend::router::condition::RouteValue;
use crate::registry::{self, Registry};

#[derive(Debug, Clone, Default)]
pub enum ShardingStrategy {
    /// Values come from the statement.
    Standard {
        column: String,
        algorithm: Arc<dyn ShardingAlgorithm>,
    },
    /// Values come from a hint.
    Hint { algorithm: Arc<dyn ShardingAlgorithm> },
    /// Every target, always.
    #[default]
    None,
}

impl ShardingStrategy {
    pub fn from_config(config: &Strategy, registry: &Registry) -> Result<Self, registry::Error> {
        Ok(match config {
            Strategy::Standard { column, algorithm } => Self::Standard {
                column: column.clone(),
                algorithm: registry.algorithm(algorithm)?,
            },
            Strategy::Hint { algorithm } => Self::Hint {
                algorithm: registry.algorithm(algorithm)?,
            },
            Strategy::None => Self::None,
        })
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Standard { column, .. } => Some(column.as_str()),
            _ => None,
        }
    }

    pub fn is_sharding_column(&self, column: &str) -> bool {
        self.column()
            .map(|c| c.eq_ignore_ascii_case(column))
            .unwrap_or(false)
    }

    pub fn is_hint(&self) -> bool {
        matches!(self, Self::Hint { .. })
    }

    /// Targets receiving the query. The result follows the order
    /// of `targets`.
    pub fn do_sharding(
        &self,
        targets: &[String],
        values: &[RouteValue],
    ) -> Result<Vec<String>, Error> {
        let selected = match self {
            Self::None => return Ok(targets.to_vec()),

            Self::Standard { algorithm, .. } => match values.first() {
                Some(RouteValue::List(list)) => {
                    let mut selected = vec![];
                    for value in &list.values {
                        let precise = PreciseShardingValue {
                            table: &list.table,
                            column: &list.column,
                            value,
                        };
                        if let Some(target) = algorithm.precise(targets, &precise)? {
                            selected.push(target);
                        }
                    }
                    selected
                }
                Some(RouteValue::Range(range)) => algorithm.range(
                    targets,
                    &RangeShardingValue {
                        table: &range.table,
                        column: &range.column,
                        range: &range.range,
                    },
                )?,
                None => return Err(Error::NoValues("standard")),
            },

            Self::Hint { algorithm } => match values.first() {
                Some(RouteValue::List(list)) => algorithm.hint(
                    targets,
                    &HintShardingValue {
                        table: &list.table,
                        column: &list.column,
                        values: &list.values,
                    },
                )?,
                Some(RouteValue::Range(_)) => return Err(Error::RangeUnsupported("hint")),
                None => return Err(Error::NoValues("hint")),
            },
        };

        // Drop anything the algorithm made up.
        Ok(targets
            .iter()
            .filter(|target| selected.iter().any(|s| s.eq_ignore_ascii_case(target)))
            .cloned()
            .collect())
    }
}
