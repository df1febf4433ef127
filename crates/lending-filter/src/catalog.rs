//! The set of field maps the engine selects from.
//!
//! A catalog is defined once, either the built-in one or one loaded from a
//! YAML/JSON definition at startup, and is not reloaded afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::field_map::{EntityType, FieldMap};

/// Field maps for every entity type plus the fallback for unknown names.
///
/// Sections missing from a loaded definition keep their built-in map; a
/// section that is present replaces the built-in map as a whole.
///
/// ```
/// use lending_filter::{Catalog, EntityType};
///
/// let catalog = Catalog::from_yaml_str(r#"
/// orders:
///   searchable_fields: [order_number, student.name]
///   value_field: deposit
/// "#).unwrap();
///
/// let orders = catalog.get(EntityType::Orders);
/// assert_eq!(orders.value_field.as_deref(), Some("deposit"));
///
/// // untouched sections stay built in
/// let products = catalog.get(EntityType::Products);
/// assert_eq!(products.value_field.as_deref(), Some("unit_price"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub products: FieldMap,
    pub students: FieldMap,
    pub orders: FieldMap,
    pub fallback: FieldMap,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

impl Catalog {
    /// The built-in catalog for products, students and orders.
    pub fn builtin() -> Self {
        Catalog {
            products: FieldMap::products(),
            students: FieldMap::students(),
            orders: FieldMap::orders(),
            fallback: FieldMap::fallback(),
        }
    }

    /// Loads a catalog from a YAML definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        debug!(format = "yaml", "loaded field map catalog");
        Ok(catalog)
    }

    /// Loads a catalog from a JSON definition.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        debug!(format = "json", "loaded field map catalog");
        Ok(catalog)
    }

    /// Returns the field map for an entity type.
    pub fn get(&self, entity: EntityType) -> &FieldMap {
        match entity {
            EntityType::Products => &self.products,
            EntityType::Students => &self.students,
            EntityType::Orders => &self.orders,
        }
    }

    /// Returns the field map for an entity name, or the fallback map when the
    /// name is not a known entity type.
    pub fn get_named(&self, name: &str) -> &FieldMap {
        match name.parse::<EntityType>() {
            Ok(entity) => self.get(entity),
            Err(_) => {
                debug!(entity = name, "unknown entity type, using fallback field map");
                &self.fallback
            }
        }
    }
}
