use shardgate_types::ShardingValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] shardgate_config::Error),

    #[error("algorithm \"{algorithm}\" can't shard non-integer value \"{value}\"")]
    NotInteger {
        algorithm: &'static str,
        value: ShardingValue,
    },

    #[error("algorithm \"{0}\" doesn't support range sharding")]
    RangeUnsupported(&'static str),

    #[error("algorithm \"{0}\" doesn't support hint sharding")]
    HintUnsupported(&'static str),

    #[error("invalid mapping: {0}")]
    Mapping(String),

    #[error("no sharding targets")]
    NoTargets,

    #[error("{0} strategy received no sharding values")]
    NoValues(&'static str),
}
