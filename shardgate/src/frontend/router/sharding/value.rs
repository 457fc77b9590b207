//! Values passed to sharding algorithms.

use std::cmp::Ordering;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use shardgate_types::ShardingValue;

/// A single value, from `col = ?`, `col IN (...)` or an INSERT.
#[derive(Debug, Clone, Copy)]
pub struct PreciseShardingValue<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub value: &'a ShardingValue,
}

/// A range of values, from `col BETWEEN ? AND ?`.
#[derive(Debug, Clone, Copy)]
pub struct RangeShardingValue<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub range: &'a ValueRange,
}

/// Values supplied out of band.
#[derive(Debug, Clone, Copy)]
pub struct HintShardingValue<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub values: &'a [ShardingValue],
}

/// Interval over sharding values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    pub lower: Bound<ShardingValue>,
    pub upper: Bound<ShardingValue>,
}

impl ValueRange {
    /// `[low, high]`, as produced by BETWEEN.
    pub fn closed(low: ShardingValue, high: ShardingValue) -> Self {
        Self {
            lower: Bound::Included(low),
            upper: Bound::Included(high),
        }
    }

    /// `[start, end)`; missing bounds are unbounded.
    pub fn closed_open(start: Option<ShardingValue>, end: Option<ShardingValue>) -> Self {
        Self {
            lower: start.map(Bound::Included).unwrap_or(Bound::Unbounded),
            upper: end.map(Bound::Excluded).unwrap_or(Bound::Unbounded),
        }
    }

    pub fn contains(&self, value: &ShardingValue) -> bool {
        let lower = match &self.lower {
            Bound::Included(lower) => value >= lower,
            Bound::Excluded(lower) => value > lower,
            Bound::Unbounded => true,
        };
        let upper = match &self.upper {
            Bound::Included(upper) => value <= upper,
            Bound::Excluded(upper) => value < upper,
            Bound::Unbounded => true,
        };
        lower && upper
    }

    /// The range contains no values.
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Included(lower), Bound::Included(upper)) => lower > upper,
            (Bound::Included(lower), Bound::Excluded(upper))
            | (Bound::Excluded(lower), Bound::Included(upper))
            | (Bound::Excluded(lower), Bound::Excluded(upper)) => lower >= upper,
            _ => false,
        }
    }

    /// Values in both ranges. `None` if they don't overlap.
    pub fn intersection(&self, other: &ValueRange) -> Option<ValueRange> {
        let lower = tighter(&self.lower, &other.lower, Ordering::Greater);
        let upper = tighter(&self.upper, &other.upper, Ordering::Less);
        let range = ValueRange { lower, upper };

        if range.is_empty() {
            None
        } else {
            Some(range)
        }
    }

    /// Inclusive integer bounds, if both ends are bounded integers.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        let lower = match &self.lower {
            Bound::Included(value) => value.integer()?,
            Bound::Excluded(value) => value.integer()?.checked_add(1)?,
            Bound::Unbounded => return None,
        };
        let upper = match &self.upper {
            Bound::Included(value) => value.integer()?,
            Bound::Excluded(value) => value.integer()?.checked_sub(1)?,
            Bound::Unbounded => return None,
        };
        Some((lower, upper))
    }
}

// Pick the more restrictive of two bounds. `wanted` is the ordering
// the restrictive bound has relative to the other one: Greater for
// lower bounds, Less for upper bounds.
fn tighter(
    a: &Bound<ShardingValue>,
    b: &Bound<ShardingValue>,
    wanted: Ordering,
) -> Bound<ShardingValue> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other.clone(),
        (
            Bound::Included(x) | Bound::Excluded(x),
            Bound::Included(y) | Bound::Excluded(y),
        ) => match x.cmp(y) {
            Ordering::Equal => {
                if matches!(a, Bound::Excluded(_)) {
                    a.clone()
                } else {
                    b.clone()
                }
            }
            ordering if ordering == wanted => a.clone(),
            _ => b.clone(),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn int(value: i64) -> ShardingValue {
        ShardingValue::Integer(value)
    }

    #[test]
    fn test_contains() {
        let range = ValueRange::closed(int(1), int(5));
        assert!(range.contains(&int(1)));
        assert!(range.contains(&int(5)));
        assert!(!range.contains(&int(6)));

        let range = ValueRange::closed_open(Some(int(0)), Some(int(100)));
        assert!(range.contains(&int(0)));
        assert!(!range.contains(&int(100)));

        let range = ValueRange::closed_open(None, Some(int(10)));
        assert!(range.contains(&int(-1000)));
    }

    #[test]
    fn test_intersection() {
        let a = ValueRange::closed(int(1), int(10));
        let b = ValueRange::closed(int(5), int(20));
        assert_eq!(a.intersection(&b), Some(ValueRange::closed(int(5), int(10))));

        let c = ValueRange::closed(int(11), int(20));
        assert!(a.intersection(&c).is_none());

        let d = ValueRange::closed_open(Some(int(0)), Some(int(10)));
        let e = ValueRange::closed(int(10), int(12));
        assert!(d.intersection(&e).is_none());

        let open = ValueRange::closed_open(None, None);
        assert_eq!(a.intersection(&open), Some(a.clone()));
    }

    #[test]
    fn test_integer_bounds() {
        let range = ValueRange::closed_open(Some(int(3)), Some(int(7)));
        assert_eq!(range.integer_bounds(), Some((3, 6)));
        assert!(ValueRange::closed_open(None, Some(int(7)))
            .integer_bounds()
            .is_none());
        assert!(ValueRange::closed("a".into(), "b".into())
            .integer_bounds()
            .is_none());
    }
}
