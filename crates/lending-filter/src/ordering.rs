//! Sorting of record lists.
//!
//! Provides [`Dir`] for sort direction, [`OrderBy`] for field-based ordering
//! and [`sort_records`] to apply a list of orderings to filtered results.

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{FilterError, Result};
use crate::record::Record;
use crate::value::Number;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ordering clause specifying a field and direction.
///
/// Parses from `field`, `field:asc` or `field:desc`:
///
/// ```
/// use lending_filter::{Dir, OrderBy};
///
/// let order: OrderBy = "unit_price:desc".parse().unwrap();
/// assert_eq!(order, OrderBy::desc("unit_price"));
/// assert_eq!("name".parse::<OrderBy>().unwrap().dir, Dir::Asc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to sort by. Dotted paths are allowed.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Asc,
        }
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Desc,
        }
    }

    /// Compares two records on this ordering's field.
    ///
    /// Missing values sort last in both directions.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        match (a.lookup(&self.field), b.lookup(&self.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_values(a, b)
                .map(|ordering| self.dir.apply(ordering))
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl FromStr for OrderBy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, dir) = match s.split_once(':') {
            None => (s, Dir::Asc),
            Some((field, "asc")) => (field, Dir::Asc),
            Some((field, "desc")) => (field, Dir::Desc),
            Some(_) => return Err(FilterError::InvalidOrdering(s.to_string())),
        };
        if field.is_empty() {
            return Err(FilterError::InvalidOrdering(s.to_string()));
        }
        Ok(OrderBy {
            field: field.to_string(),
            dir,
        })
    }
}

/// Compares two present record values.
///
/// Numbers and numeric strings compare numerically and sort before other
/// strings, which compare case-insensitively. Booleans compare with
/// `false < true`. Returns `None` on any other kind mismatch.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_) | Value::String(_), Value::Number(_) | Value::String(_)) => {
            let (num_a, num_b) = (Number::from_json(a), Number::from_json(b));
            match (num_a.is_nan(), num_b.is_nan()) {
                (false, false) => num_a.compare(num_b),
                (false, true) => Some(Ordering::Less),
                (true, false) => Some(Ordering::Greater),
                (true, true) => {
                    let (text_a, text_b) = (a.as_str()?, b.as_str()?);
                    Some(text_a.to_lowercase().cmp(&text_b.to_lowercase()))
                }
            }
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sorts records in place by a list of orderings.
///
/// Uses the first ordering as the primary key, the second to break ties, and
/// so on. The sort is stable: records that compare equal on every key keep
/// their filtered order.
///
/// ```
/// use lending_filter::{sort_records, OrderBy};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"name": "b", "qty": 1}),
///     json!({"name": "a", "qty": 1}),
///     json!({"name": "c", "qty": 5}),
/// ];
/// let mut view: Vec<_> = records.iter().collect();
/// sort_records(&mut view, &[OrderBy::desc("qty"), OrderBy::asc("name")]);
/// assert_eq!(view, vec![&records[2], &records[1], &records[0]]);
/// ```
pub fn sort_records<R: Record>(records: &mut [R], orderings: &[OrderBy]) {
    if orderings.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_by_orderings(a, b, orderings));
}

fn compare_by_orderings<R: Record + ?Sized>(a: &R, b: &R, orderings: &[OrderBy]) -> Ordering {
    for order_by in orderings {
        let ordering = order_by.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
