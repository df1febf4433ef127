//! Lending Filter - record filtering for college inventory and lending data.
//!
//! The crate filters in-memory collections of products, students and orders
//! by the selections a user makes in a filter panel: free-text search, a date
//! range, status, category, course, year, returnable flag, lender and a
//! numeric value range. Records are the loosely typed JSON rows a data layer
//! returns; the engine never fetches, pages or caches them.
//!
//! # Quick Start
//!
//! ```rust
//! use lending_filter::{EntityType, FilterEngine, FilterField, FilterState};
//! use serde_json::json;
//!
//! let orders = vec![
//!     json!({"order_number": "ORD-1", "status": "active", "total_value": 150}),
//!     json!({"order_number": "ORD-2", "status": "active", "total_value": 250}),
//!     json!({"order_number": "ORD-3", "status": "active"}),
//!     json!({"order_number": "ORD-4", "status": "returned", "total_value": 120}),
//! ];
//!
//! let mut state = FilterState::new();
//! state.update(FilterField::Status, "active").unwrap();
//! state.update(FilterField::MinValue, "100").unwrap();
//! state.update(FilterField::MaxValue, "200").unwrap();
//!
//! let engine = FilterEngine::new();
//! let result = engine.apply(EntityType::Orders, &state, &orders);
//!
//! // ORD-3 has no value and is kept; ORD-2 is out of range
//! assert_eq!(result.records, vec![&orders[0], &orders[2]]);
//! assert_eq!(result.active_count(), 3);
//! ```
//!
//! # Pipeline
//!
//! Stages run in a fixed order and combine with AND:
//!
//! ```text
//! search → date range → status → category → course → year
//!        → returnable → lender → value range
//! ```
//!
//! A stage whose state field is empty, or that the entity's [`FieldMap`] does
//! not map, is skipped. Missing record fields drop the record, with one
//! exception: a record without a value is kept by the value range.
//!
//! # Entity Rules
//!
//! | Entity | Status | Extra stages | Value field |
//! |--------|--------|--------------|-------------|
//! | products | stock band from `quantity_available` | category, returnable | `unit_price` |
//! | students | `is_active` flag | course, year | none |
//! | orders | `status` equality | lender | `total_value` |

mod catalog;
mod engine;
mod error;
mod field_map;
mod ordering;
mod predicate;
mod record;
mod stage;
mod state;
mod value;

pub use catalog::Catalog;
pub use engine::{apply, FilterEngine, Filtered};
pub use error::{FilterError, Result};
pub use field_map::{
    DateFieldOption, EntityType, FieldMap, IdOrName, StatusRule, LOW_STOCK_THRESHOLD,
};
pub use ordering::{compare_values, sort_records, Dir, OrderBy};
pub use predicate::{search_records, Clause, Predicate, StockBand};
pub use record::Record;
pub use stage::Stage;
pub use state::{FilterField, FilterState, TriState};
pub use value::{Number, Timestamp};
