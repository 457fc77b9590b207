//! Free-form property bags attached to algorithms and key generators.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// String-keyed properties, e.g. `"worker.id" = 3`.
///
/// TOML strings, numbers and booleans are all accepted and stored
/// as strings. Unquoted dotted keys (`worker.id = 3`) create nested
/// tables in TOML; those are flattened back into dotted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Table(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    fn flatten(self, key: String, out: &mut BTreeMap<String, String>) {
        match self {
            Self::Boolean(value) => {
                out.insert(key, value.to_string());
            }
            Self::Integer(value) => {
                out.insert(key, value.to_string());
            }
            Self::Float(value) => {
                out.insert(key, value.to_string());
            }
            Self::String(value) => {
                out.insert(key, value);
            }
            Self::Table(table) => {
                for (name, value) in table {
                    value.flatten(format!("{}.{}", key, name), out);
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, PropertyValue>::deserialize(deserializer)?;
        let mut props = BTreeMap::new();
        for (key, value) in raw {
            value.flatten(key, &mut props);
        }
        Ok(Self(props))
    }
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Parse a property, falling back to `default` when it's not set.
    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T, Error>
    where
        T: FromStr,
    {
        match self.get(key) {
            Some(value) => value.trim().parse().map_err(|_| Error::InvalidProperty {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Ok(default),
        }
    }

    pub fn insert(&mut self, key: impl ToString, value: impl Display) -> &mut Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: ToString, V: Display> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
