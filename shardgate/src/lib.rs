pub mod backend;
pub mod cli;
pub mod config;
pub mod frontend;
pub mod logger;
pub mod registry;
pub mod rule;
pub mod unique_id;

pub use logger::logger;
pub use shardgate_types::{Datum, ShardingValue};
