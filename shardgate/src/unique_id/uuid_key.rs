use shardgate_types::ShardingValue;
use uuid::Uuid;

use super::{Error, KeyGenerator};

/// Random (v4) UUID keys, as 32 hex characters without dashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKey;

impl KeyGenerator for UuidKey {
    fn generate_key(&self) -> Result<ShardingValue, Error> {
        Ok(ShardingValue::String(Uuid::new_v4().simple().to_string()))
    }
}
