// Submodules
pub mod core;
pub mod database;
pub mod error;
pub mod general;
pub mod props;
pub mod sharding;
pub mod util;

pub use core::Config;
pub use database::{DataSource, MasterSlaveRule};
pub use error::Error;
pub use general::{General, LogFormat};
pub use props::Properties;
pub use sharding::*;
pub use shardgate_types::ShardingValue;
