//! Per-entity field mapping.
//!
//! A [`FieldMap`] tells the engine which record fields each stage reads for a
//! given [`EntityType`]. Entity-specific behaviour (how "status" is decided,
//! whether a category filter applies, which field carries the value) lives
//! here as data, so the pipeline itself never branches on the entity type.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Inclusive upper bound of the low-stock band for products.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// The record collections the engine knows how to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Products,
    Students,
    Orders,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [
        EntityType::Products,
        EntityType::Students,
        EntityType::Orders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Products => "products",
            EntityType::Students => "students",
            EntityType::Orders => "orders",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|entity| entity.as_str() == s)
            .ok_or_else(|| FilterError::UnknownEntityType(s.to_string()))
    }
}

/// A date field offered for range filtering, with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFieldOption {
    pub field: String,
    pub label: String,
}

impl DateFieldOption {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        DateFieldOption {
            field: field.into(),
            label: label.into(),
        }
    }
}

/// A filter that matches either a numeric id field or a display-name field.
///
/// The filter text matches when it parses to the record's id, or when it
/// equals the record's name verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdOrName {
    pub id_field: String,
    pub name_field: String,
}

impl IdOrName {
    pub fn new(id_field: impl Into<String>, name_field: impl Into<String>) -> Self {
        IdOrName {
            id_field: id_field.into(),
            name_field: name_field.into(),
        }
    }
}

/// How the `status` filter value is judged against a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusRule {
    /// Status filtering does not apply.
    #[default]
    Disabled,
    /// `active` / `inactive` select on a boolean flag.
    ActiveFlag { field: String },
    /// The filter value must equal the record's field.
    Equals { field: String },
    /// Stock band derived from a quantity field:
    /// `out_of_stock` is zero, `low_stock` is `1..=threshold`,
    /// `in_stock` is above the threshold.
    StockLevel {
        field: String,
        #[serde(default = "default_low_stock_threshold")]
        low_stock_threshold: i64,
    },
}

fn default_low_stock_threshold() -> i64 {
    LOW_STOCK_THRESHOLD
}

/// Static field configuration for one entity type.
///
/// ```
/// use lending_filter::{EntityType, FieldMap};
///
/// let products = FieldMap::for_entity(EntityType::Products);
/// assert_eq!(products.value_field.as_deref(), Some("unit_price"));
/// assert_eq!(products.effective_date_field(None), Some("created_at"));
/// assert_eq!(products.effective_date_field(Some("updated_at")), Some("updated_at"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    /// Fields scanned by text search, in order. Dotted paths are allowed.
    pub searchable_fields: Vec<String>,
    /// Date fields offered for range filtering.
    pub date_field_options: Vec<DateFieldOption>,
    /// Date field used when the state names none.
    pub default_date_field: Option<String>,
    /// Status values the UI offers.
    pub status_options: Vec<String>,
    /// Field checked by the min/max range.
    pub value_field: Option<String>,
    pub status: StatusRule,
    pub category: Option<IdOrName>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub returnable: Option<String>,
    pub lender: Option<IdOrName>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FieldMap {
    /// Returns the built-in map for an entity type.
    pub fn for_entity(entity: EntityType) -> Self {
        match entity {
            EntityType::Products => FieldMap::products(),
            EntityType::Students => FieldMap::students(),
            EntityType::Orders => FieldMap::orders(),
        }
    }

    pub fn products() -> Self {
        FieldMap {
            searchable_fields: strings(&["name", "description", "sku", "category_name"]),
            date_field_options: vec![
                DateFieldOption::new("created_at", "Created Date"),
                DateFieldOption::new("updated_at", "Updated Date"),
            ],
            default_date_field: Some("created_at".to_string()),
            status_options: strings(&["in_stock", "low_stock", "out_of_stock"]),
            value_field: Some("unit_price".to_string()),
            status: StatusRule::StockLevel {
                field: "quantity_available".to_string(),
                low_stock_threshold: LOW_STOCK_THRESHOLD,
            },
            category: Some(IdOrName::new("category_id", "category_name")),
            returnable: Some("is_returnable".to_string()),
            ..FieldMap::default()
        }
    }

    pub fn students() -> Self {
        FieldMap {
            searchable_fields: strings(&["name", "email", "student_id", "phone", "course"]),
            date_field_options: vec![
                DateFieldOption::new("created_at", "Registration Date"),
                DateFieldOption::new("updated_at", "Updated Date"),
            ],
            default_date_field: Some("created_at".to_string()),
            status_options: strings(&["active", "inactive"]),
            status: StatusRule::ActiveFlag {
                field: "is_active".to_string(),
            },
            course: Some("course".to_string()),
            year: Some("year_of_study".to_string()),
            ..FieldMap::default()
        }
    }

    pub fn orders() -> Self {
        FieldMap {
            searchable_fields: strings(&[
                "order_number",
                "student_name",
                "product_name",
                "lender_name",
                "notes",
            ]),
            date_field_options: vec![
                DateFieldOption::new("lending_date", "Lending Date"),
                DateFieldOption::new("expected_return_date", "Expected Return"),
                DateFieldOption::new("actual_return_date", "Actual Return"),
                DateFieldOption::new("created_at", "Created Date"),
            ],
            default_date_field: Some("lending_date".to_string()),
            status_options: strings(&["pending", "active", "returned", "overdue", "cancelled"]),
            value_field: Some("total_value".to_string()),
            status: StatusRule::Equals {
                field: "status".to_string(),
            },
            lender: Some(IdOrName::new("lender_id", "lender_name")),
            ..FieldMap::default()
        }
    }

    /// Map used for entity names the catalog does not know.
    ///
    /// Only text search over `name` applies; every other stage is a no-op.
    pub fn fallback() -> Self {
        FieldMap {
            searchable_fields: strings(&["name"]),
            ..FieldMap::default()
        }
    }

    /// Resolves the date field a range applies to: the requested one if
    /// given and non-empty, otherwise the map's default.
    ///
    /// A map that declares neither a default nor any date option has no date
    /// range, so a requested field is ignored.
    pub fn effective_date_field<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        if self.default_date_field.is_none() && self.date_field_options.is_empty() {
            return None;
        }
        requested
            .filter(|field| !field.is_empty())
            .or(self.default_date_field.as_deref())
    }

    /// Display label of a date field option.
    pub fn date_field_label(&self, field: &str) -> Option<&str> {
        self.date_field_options
            .iter()
            .find(|option| option.field == field)
            .map(|option| option.label.as_str())
    }

    /// Returns `true` if the UI offers this status value.
    pub fn has_status_option(&self, status: &str) -> bool {
        self.status_options.iter().any(|option| option == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_names_round_trip() {
        for entity in EntityType::ALL {
            assert_eq!(entity.as_str().parse::<EntityType>().unwrap(), entity);
        }
        assert!(matches!(
            "lenders".parse::<EntityType>(),
            Err(FilterError::UnknownEntityType(name)) if name == "lenders"
        ));
    }

    #[test]
    fn products_map() {
        let map = FieldMap::products();
        assert_eq!(
            map.status,
            StatusRule::StockLevel {
                field: "quantity_available".into(),
                low_stock_threshold: 10
            }
        );
        assert_eq!(map.category, Some(IdOrName::new("category_id", "category_name")));
        assert_eq!(map.returnable.as_deref(), Some("is_returnable"));
        assert!(map.course.is_none());
        assert!(map.lender.is_none());
        assert!(map.has_status_option("low_stock"));
    }

    #[test]
    fn students_have_no_value_field() {
        let map = FieldMap::students();
        assert!(map.value_field.is_none());
        assert_eq!(map.year.as_deref(), Some("year_of_study"));
        assert_eq!(map.date_field_label("created_at"), Some("Registration Date"));
    }

    #[test]
    fn orders_map() {
        let map = FieldMap::orders();
        assert_eq!(map.value_field.as_deref(), Some("total_value"));
        assert_eq!(map.lender, Some(IdOrName::new("lender_id", "lender_name")));
        assert_eq!(map.effective_date_field(None), Some("lending_date"));
        assert_eq!(map.effective_date_field(Some("")), Some("lending_date"));
        assert_eq!(
            map.effective_date_field(Some("actual_return_date")),
            Some("actual_return_date")
        );
    }

    #[test]
    fn fallback_only_searches() {
        let map = FieldMap::fallback();
        assert_eq!(map.searchable_fields, vec!["name".to_string()]);
        assert_eq!(map.status, StatusRule::Disabled);
        assert!(map.value_field.is_none());
        assert_eq!(map.effective_date_field(None), None);
        assert_eq!(map.effective_date_field(Some("created_at")), None);
    }

    #[test]
    fn status_rule_yaml_shape() {
        let rule: StatusRule = serde_yaml::from_str("kind: stock_level\nfield: qty\n").unwrap();
        assert_eq!(
            rule,
            StatusRule::StockLevel {
                field: "qty".into(),
                low_stock_threshold: LOW_STOCK_THRESHOLD
            }
        );
    }
}
