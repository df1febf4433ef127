//! Filter state: the user's current selections.
//!
//! A [`FilterState`] starts empty, is edited one field at a time as the user
//! types or picks, and is thrown away on reset. An empty field never
//! constrains anything: it is not "match nothing" and not "match the empty
//! string".

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::value::Number;

/// Three-valued selection for boolean filters.
///
/// Serialized as `""`, `"true"` and `"false"` so that form state round-trips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    /// No selection.
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Selected "yes".
    #[serde(rename = "true")]
    True,
    /// Selected "no".
    #[serde(rename = "false")]
    False,
}

impl TriState {
    /// Returns the selected boolean, or `None` when unset.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::True => Some(true),
            TriState::False => Some(false),
        }
    }

    /// Returns `true` when no selection is made.
    pub fn is_unset(self) -> bool {
        matches!(self, TriState::Unset)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriState::Unset => "",
            TriState::True => "true",
            TriState::False => "false",
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(b) => b.into(),
            None => TriState::Unset,
        }
    }
}

/// Names of the fields of a [`FilterState`].
///
/// Parsed from and displayed as the camelCase names used by the form layer
/// (`dateFrom`, `isReturnable`, `minValue`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Search,
    DateFrom,
    DateTo,
    DateField,
    Status,
    Category,
    Course,
    Year,
    IsActive,
    IsReturnable,
    StockLevel,
    Lender,
    MinValue,
    MaxValue,
}

impl FilterField {
    /// All fields in declaration order.
    pub const ALL: [FilterField; 14] = [
        FilterField::Search,
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::DateField,
        FilterField::Status,
        FilterField::Category,
        FilterField::Course,
        FilterField::Year,
        FilterField::IsActive,
        FilterField::IsReturnable,
        FilterField::StockLevel,
        FilterField::Lender,
        FilterField::MinValue,
        FilterField::MaxValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::DateFrom => "dateFrom",
            FilterField::DateTo => "dateTo",
            FilterField::DateField => "dateField",
            FilterField::Status => "status",
            FilterField::Category => "category",
            FilterField::Course => "course",
            FilterField::Year => "year",
            FilterField::IsActive => "isActive",
            FilterField::IsReturnable => "isReturnable",
            FilterField::StockLevel => "stockLevel",
            FilterField::Lender => "lender",
            FilterField::MinValue => "minValue",
            FilterField::MaxValue => "maxValue",
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FilterError::UnknownField(s.to_string()))
    }
}

/// The user's current filter selections.
///
/// Every field is optional. String fields holding `Some("")` are treated the
/// same as `None` everywhere, so a state deserialized from a form that posts
/// empty strings behaves like an empty state.
///
/// # Example
///
/// ```
/// use lending_filter::{FilterField, FilterState};
///
/// let mut state = FilterState::new().search("wid").status("low_stock");
/// assert_eq!(state.active_count(), 2);
///
/// state.update(FilterField::MinValue, "10").unwrap();
/// assert_eq!(state.min_value, Some(10.0));
///
/// state.update(FilterField::Search, "").unwrap();
/// assert_eq!(state.active_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub date_field: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub course: Option<String>,
    pub year: Option<i64>,
    pub is_active: TriState,
    pub is_returnable: TriState,
    pub stock_level: Option<String>,
    pub lender: Option<String>,
    #[serde(with = "range_bound")]
    pub min_value: Option<f64>,
    #[serde(with = "range_bound")]
    pub max_value: Option<f64>,
}

/// Serde form of a value-range bound.
///
/// Finite bounds are plain numbers. A malformed bound is NaN, which JSON has
/// no number for, so it travels as the string `"NaN"` and stays active. On
/// input a string bound is parsed like form text and an empty string is unset.
mod range_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::value::Number;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bound {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bound) if bound.is_finite() => serializer.serialize_some(bound),
            Some(bound) => serializer.serialize_some(&bound.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Bound>::deserialize(deserializer)? {
            None => None,
            Some(Bound::Number(bound)) => Some(bound),
            Some(Bound::Text(text)) if text.is_empty() => None,
            Some(Bound::Text(text)) => Some(Number::parse(&text).to_f64()),
        })
    }
}

fn text(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Returns the string content of an optional text field, treating empty as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl FilterState {
    /// Creates an empty state. An empty state matches every record.
    pub fn new() -> Self {
        FilterState::default()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = text(term);
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = text(field);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = text(status);
        self
    }

    /// Category id (as text) or category display name.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = text(category);
        self
    }

    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.course = text(course);
        self
    }

    pub fn year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    pub fn is_active(mut self, value: impl Into<TriState>) -> Self {
        self.is_active = value.into();
        self
    }

    pub fn is_returnable(mut self, value: impl Into<TriState>) -> Self {
        self.is_returnable = value.into();
        self
    }

    pub fn stock_level(mut self, level: impl Into<String>) -> Self {
        self.stock_level = text(level);
        self
    }

    /// Lender id (as text) or lender display name.
    pub fn lender(mut self, lender: impl Into<String>) -> Self {
        self.lender = text(lender);
        self
    }

    pub fn min_value(mut self, value: f64) -> Self {
        self.min_value = Some(value);
        self
    }

    pub fn max_value(mut self, value: f64) -> Self {
        self.max_value = Some(value);
        self
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Sets one field from raw form text.
    ///
    /// Empty text clears the field. Dates must be `YYYY-MM-DD`, the year an
    /// integer, and tri-states `true`/`false`. Malformed min/max text is
    /// stored as NaN, which matches no priced record.
    pub fn update(&mut self, field: FilterField, raw: &str) -> Result<()> {
        if raw.is_empty() {
            self.clear(field);
            return Ok(());
        }
        match field {
            FilterField::Search => self.search = text(raw),
            FilterField::DateFrom => self.date_from = Some(parse_date("dateFrom", raw)?),
            FilterField::DateTo => self.date_to = Some(parse_date("dateTo", raw)?),
            FilterField::DateField => self.date_field = text(raw),
            FilterField::Status => self.status = text(raw),
            FilterField::Category => self.category = text(raw),
            FilterField::Course => self.course = text(raw),
            FilterField::Year => {
                let year = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| FilterError::InvalidYear(raw.to_string()))?;
                self.year = Some(year);
            }
            FilterField::IsActive => self.is_active = parse_tri_state("isActive", raw)?,
            FilterField::IsReturnable => {
                self.is_returnable = parse_tri_state("isReturnable", raw)?
            }
            FilterField::StockLevel => self.stock_level = text(raw),
            FilterField::Lender => self.lender = text(raw),
            FilterField::MinValue => self.min_value = Some(Number::parse(raw).to_f64()),
            FilterField::MaxValue => self.max_value = Some(Number::parse(raw).to_f64()),
        }
        Ok(())
    }

    /// Sets one field addressed by its camelCase name.
    pub fn update_named(&mut self, name: &str, raw: &str) -> Result<()> {
        let field = name.parse::<FilterField>()?;
        self.update(field, raw)
    }

    /// Clears a single field.
    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Search => self.search = None,
            FilterField::DateFrom => self.date_from = None,
            FilterField::DateTo => self.date_to = None,
            FilterField::DateField => self.date_field = None,
            FilterField::Status => self.status = None,
            FilterField::Category => self.category = None,
            FilterField::Course => self.course = None,
            FilterField::Year => self.year = None,
            FilterField::IsActive => self.is_active = TriState::Unset,
            FilterField::IsReturnable => self.is_returnable = TriState::Unset,
            FilterField::StockLevel => self.stock_level = None,
            FilterField::Lender => self.lender = None,
            FilterField::MinValue => self.min_value = None,
            FilterField::MaxValue => self.max_value = None,
        }
    }

    /// Clears every field.
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Returns `true` if the field holds a value.
    ///
    /// `0`, `false` and NaN are all values: the user entered something.
    pub fn is_set(&self, field: FilterField) -> bool {
        match field {
            FilterField::Search => non_empty(&self.search).is_some(),
            FilterField::DateFrom => self.date_from.is_some(),
            FilterField::DateTo => self.date_to.is_some(),
            FilterField::DateField => non_empty(&self.date_field).is_some(),
            FilterField::Status => non_empty(&self.status).is_some(),
            FilterField::Category => non_empty(&self.category).is_some(),
            FilterField::Course => non_empty(&self.course).is_some(),
            FilterField::Year => self.year.is_some(),
            FilterField::IsActive => !self.is_active.is_unset(),
            FilterField::IsReturnable => !self.is_returnable.is_unset(),
            FilterField::StockLevel => non_empty(&self.stock_level).is_some(),
            FilterField::Lender => non_empty(&self.lender).is_some(),
            FilterField::MinValue => self.min_value.is_some(),
            FilterField::MaxValue => self.max_value.is_some(),
        }
    }

    /// Fields currently holding a value, in declaration order.
    pub fn active_fields(&self) -> Vec<FilterField> {
        FilterField::ALL
            .into_iter()
            .filter(|field| self.is_set(*field))
            .collect()
    }

    /// Number of fields currently holding a value.
    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .into_iter()
            .filter(|field| self.is_set(*field))
            .count()
    }

    /// Returns `true` if no field holds a value.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| FilterError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn parse_tri_state(field: &'static str, raw: &str) -> Result<TriState> {
    match raw.trim() {
        "" => Ok(TriState::Unset),
        "true" => Ok(TriState::True),
        "false" => Ok(TriState::False),
        _ => Err(FilterError::InvalidTriState {
            field,
            value: raw.to_string(),
        }),
    }
}
