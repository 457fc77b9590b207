//! Values a table can be sharded on.

use std::fmt::Display;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Datum, Error};

/// A comparable sharding value.
///
/// Ordering is total: integers sort before UUIDs, which sort before strings.
/// Algorithms only compare values of the same kind.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum ShardingValue {
    Integer(i64),
    Uuid(Uuid),
    String(String),
}

impl ShardingValue {
    pub fn integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(value) => Some(*value),
            _ => None,
        }
    }

    pub fn varchar(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Stable byte representation, used for hashing.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Integer(value) => value.to_be_bytes().to_vec(),
            Self::Uuid(value) => value.as_bytes().to_vec(),
            Self::String(value) => value.as_bytes().to_vec(),
        }
    }

    /// Both values are of the same kind.
    pub fn same_kind(&self, other: &ShardingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Display for ShardingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Uuid(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for ShardingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Uuid> for ShardingValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<String> for ShardingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ShardingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl TryFrom<&Datum> for ShardingValue {
    type Error = Error;

    fn try_from(value: &Datum) -> Result<Self, Self::Error> {
        match value {
            Datum::Null => Err(Error::Null),
            Datum::Bigint(value) => Ok(Self::Integer(*value)),
            Datum::Text(value) => Ok(Self::String(value.clone())),
            Datum::Uuid(value) => Ok(Self::Uuid(*value)),
            Datum::Numeric(value) => {
                if value.fract().is_zero() {
                    value
                        .to_i64()
                        .map(Self::Integer)
                        .ok_or_else(|| Error::NotInteger(value.to_string()))
                } else {
                    Err(Error::NotInteger(value.to_string()))
                }
            }
            other => Err(Error::NotShardable(other.data_type())),
        }
    }
}

impl From<ShardingValue> for Datum {
    fn from(value: ShardingValue) -> Self {
        match value {
            ShardingValue::Integer(value) => Datum::Bigint(value),
            ShardingValue::Uuid(value) => Datum::Uuid(value),
            ShardingValue::String(value) => Datum::Text(value),
        }
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_from_datum() {
        assert_eq!(
            ShardingValue::try_from(&Datum::Bigint(7)).unwrap(),
            ShardingValue::Integer(7)
        );
        assert_eq!(
            ShardingValue::try_from(&Datum::Numeric(Decimal::new(1200, 2))).unwrap(),
            ShardingValue::Integer(12)
        );
        assert_eq!(
            ShardingValue::try_from(&Datum::Numeric(Decimal::new(1250, 2))),
            Err(Error::NotInteger("12.50".into()))
        );
        assert_eq!(ShardingValue::try_from(&Datum::Null), Err(Error::Null));
        assert_eq!(
            ShardingValue::try_from(&Datum::Double(1.5)),
            Err(Error::NotShardable("double"))
        );
    }

    #[test]
    fn test_untagged() {
        let values: Vec<ShardingValue> =
            serde_json::from_str(r#"[1, "books", "67e55044-10b1-426f-9247-bb680e5fe0c8"]"#)
                .unwrap();
        assert_eq!(values[0], ShardingValue::Integer(1));
        assert_eq!(values[1], ShardingValue::String("books".into()));
        assert!(values[2].uuid().is_some());
    }

    #[test]
    fn test_integer_ordering() {
        assert!(ShardingValue::Integer(-5) < ShardingValue::Integer(3));
        assert!(ShardingValue::from("a") < ShardingValue::from("b"));
    }
}
