//! Distributed key generation.
//!
//! Keys are generated for INSERTs that omit a table's generated
//! column. Generators are resolved by type through the registry.

use std::fmt::Debug;

use shardgate_types::ShardingValue;

pub mod clock;
pub mod error;
pub mod snowflake;
pub mod uuid_key;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use snowflake::Snowflake;
pub use uuid_key::UuidKey;

/// Generates one key per call.
pub trait KeyGenerator: Send + Sync + Debug {
    fn generate_key(&self) -> Result<ShardingValue, Error>;
}
