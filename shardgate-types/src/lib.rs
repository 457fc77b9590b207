pub mod datum;
pub mod error;
pub mod sharding_value;

pub use datum::Datum;
pub use error::Error;
pub use sharding_value::ShardingValue;
