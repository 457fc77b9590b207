//! Sharding conditions extracted from statements.

use serde::Serialize;
use shardgate_types::ShardingValue;

use super::sharding::ValueRange;

pub mod generated_key;
pub mod insert;
pub mod where_clause;

pub use generated_key::GeneratedKey;
pub use insert::InsertConditions;
pub use where_clause::WhereConditions;

/// Values a column of a logic table is pinned to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteValue {
    List(ListRouteValue),
    Range(RangeRouteValue),
}

impl RouteValue {
    pub fn list(table: &str, column: &str, values: Vec<ShardingValue>) -> Self {
        Self::List(ListRouteValue {
            table: table.to_string(),
            column: column.to_string(),
            values,
        })
    }

    pub fn range(table: &str, column: &str, range: ValueRange) -> Self {
        Self::Range(RangeRouteValue {
            table: table.to_string(),
            column: column.to_string(),
            range,
        })
    }

    pub fn table(&self) -> &str {
        match self {
            Self::List(value) => &value.table,
            Self::Range(value) => &value.table,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::List(value) => &value.column,
            Self::Range(value) => &value.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRouteValue {
    pub table: String,
    pub column: String,
    pub values: Vec<ShardingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRouteValue {
    pub table: String,
    pub column: String,
    pub range: ValueRange,
}

/// Route values from one INSERT row or one OR branch of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShardingCondition {
    pub route_values: Vec<RouteValue>,
    /// The predicates contradict each other, e.g. `id = 1 AND id = 2`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub always_false: bool,
}

impl ShardingCondition {
    pub fn new(route_values: Vec<RouteValue>) -> Self {
        Self {
            route_values,
            always_false: false,
        }
    }

    pub fn always_false() -> Self {
        Self {
            route_values: vec![],
            always_false: true,
        }
    }

    pub fn is_always_false(&self) -> bool {
        self.always_false
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ShardingConditions {
    conditions: Vec<ShardingCondition>,
}

impl ShardingConditions {
    pub fn new(conditions: Vec<ShardingCondition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[ShardingCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// No row can satisfy any of the conditions.
    pub fn is_always_false(&self) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.is_always_false())
    }

    /// Keep only the last condition.
    pub fn merge(&mut self) {
        if let Some(last) = self.conditions.pop() {
            self.conditions = vec![last];
        }
    }
}
