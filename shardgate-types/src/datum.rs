//! A single typed value: a row cell or a bound parameter.

use std::fmt::Display;

use bytes::Bytes;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    #[default]
    Null,
    Boolean(bool),
    Bigint(i64),
    Double(f64),
    Numeric(Decimal),
    Text(String),
    Bytea(Bytes),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the data type, used in error messages.
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Bigint(_) => "bigint",
            Self::Double(_) => "double",
            Self::Numeric(_) => "numeric",
            Self::Text(_) => "text",
            Self::Bytea(_) => "bytea",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
        }
    }

    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            Self::Bigint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            Self::Bigint(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Bigint(value) => write!(f, "{}", value),
            Self::Double(value) => write!(f, "{}", value),
            Self::Numeric(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
            Self::Bytea(value) => write!(f, "\\x{}", hex(value)),
            Self::Timestamp(value) => write!(f, "{}", value),
            Self::Uuid(value) => write!(f, "{}", value),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Self::Bigint(value)
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Self::Bigint(value.into())
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for Datum {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Decimal> for Datum {
    fn from(value: Decimal) -> Self {
        Self::Numeric(value)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Bytes> for Datum {
    fn from(value: Bytes) -> Self {
        Self::Bytea(value)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Datum::Null)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_option_into_null() {
        let none: Option<i64> = None;
        assert!(Datum::from(none).is_null());
        assert_eq!(Datum::from(Some(5_i64)), Datum::Bigint(5));
    }

    #[test]
    fn test_serde_tagged() {
        let datum: Datum = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(datum.as_text(), Some("hello"));

        let datum: Datum = serde_json::from_str(r#""null""#).unwrap();
        assert!(datum.is_null());
    }

    #[test]
    fn test_display_bytea() {
        let datum = Datum::Bytea(Bytes::from_static(&[0xde, 0xad]));
        assert_eq!(datum.to_string(), "\\xdead");
    }
}
