//! Filter execution.
//!
//! [`apply`] runs the pipeline for one field map; [`FilterEngine`] bundles a
//! [`Catalog`] so callers can filter by [`EntityType`] or by entity name.
//! Both are pure: the same inputs always produce the same output, and the
//! engine keeps nothing between calls.

use tracing::{debug, debug_span, trace};

use crate::catalog::Catalog;
use crate::field_map::{EntityType, FieldMap};
use crate::predicate::Predicate;
use crate::record::Record;
use crate::state::{FilterField, FilterState};

/// Result of applying a filter state to a record list.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered<'a, R> {
    /// Surviving records, in input order.
    pub records: Vec<&'a R>,
    /// Fields of the state that held a value.
    pub active_fields: Vec<FilterField>,
}

impl<'a, R> Filtered<'a, R> {
    /// Number of active filter fields. Depends only on the state.
    pub fn active_count(&self) -> usize {
        self.active_fields.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clones the surviving records out of the input.
    pub fn cloned(&self) -> Vec<R>
    where
        R: Clone,
    {
        self.records.iter().map(|record| (*record).clone()).collect()
    }
}

/// Filters `records` with `state` under `map`.
///
/// Stages run in pipeline order and each narrows the surviving set. An empty
/// state returns every record.
///
/// # Example
///
/// ```
/// use lending_filter::{apply, FieldMap, FilterState};
/// use serde_json::json;
///
/// let records = vec![
///     json!({"name": "Widget", "quantity_available": 0}),
///     json!({"name": "Gadget", "quantity_available": 15}),
/// ];
///
/// let state = FilterState::new().status("out_of_stock");
/// let result = apply(&FieldMap::products(), &state, &records);
///
/// assert_eq!(result.records, vec![&records[0]]);
/// assert_eq!(result.active_count(), 1);
/// ```
pub fn apply<'a, R: Record>(
    map: &FieldMap,
    state: &FilterState,
    records: &'a [R],
) -> Filtered<'a, R> {
    let predicate = Predicate::compile(map, state);
    let mut surviving: Vec<&'a R> = records.iter().collect();

    for clause in predicate.clauses() {
        surviving.retain(|record| clause.matches(*record));
        trace!(stage = %clause.stage(), remaining = surviving.len(), "stage applied");
    }

    let active_fields = state.active_fields();
    debug!(
        input = records.len(),
        output = surviving.len(),
        active = active_fields.len(),
        "filters applied"
    );

    Filtered {
        records: surviving,
        active_fields,
    }
}

/// Filter engine over a fixed [`Catalog`].
///
/// ```
/// use lending_filter::{EntityType, FilterEngine, FilterState};
/// use serde_json::json;
///
/// let engine = FilterEngine::new();
/// let students = vec![
///     json!({"name": "Asha", "is_active": true}),
///     json!({"name": "Ravi", "is_active": false}),
/// ];
///
/// let state = FilterState::new().status("active");
/// let result = engine.apply(EntityType::Students, &state, &students);
/// assert_eq!(result.records, vec![&students[0]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    catalog: Catalog,
}

impl FilterEngine {
    /// Creates an engine over the built-in catalog.
    pub fn new() -> Self {
        FilterEngine::default()
    }

    /// Creates an engine over a custom catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        FilterEngine { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Field map the engine uses for an entity type.
    pub fn field_map(&self, entity: EntityType) -> &FieldMap {
        self.catalog.get(entity)
    }

    /// Filters records of a known entity type.
    pub fn apply<'a, R: Record>(
        &self,
        entity: EntityType,
        state: &FilterState,
        records: &'a [R],
    ) -> Filtered<'a, R> {
        let _span = debug_span!("apply", entity = %entity).entered();
        apply(self.catalog.get(entity), state, records)
    }

    /// Filters records of an entity addressed by name.
    ///
    /// Unknown names use the catalog's fallback map, under which only text
    /// search applies.
    pub fn apply_named<'a, R: Record>(
        &self,
        entity: &str,
        state: &FilterState,
        records: &'a [R],
    ) -> Filtered<'a, R> {
        let _span = debug_span!("apply", entity).entered();
        apply(self.catalog.get_named(entity), state, records)
    }

    /// Filters records and clones the survivors.
    ///
    /// Returns the records together with the active filter count.
    pub fn apply_cloned<R: Record + Clone>(
        &self,
        entity: EntityType,
        state: &FilterState,
        records: &[R],
    ) -> (Vec<R>, usize) {
        let filtered = self.apply(entity, state, records);
        (filtered.cloned(), filtered.active_count())
    }

    /// Tests a single record.
    pub fn matches<R: Record + ?Sized>(
        &self,
        entity: EntityType,
        state: &FilterState,
        record: &R,
    ) -> bool {
        Predicate::compile(self.catalog.get(entity), state).matches(record)
    }
}
