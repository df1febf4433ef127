//! Predicate compiled from a filter state and a field map.
//!
//! [`Predicate::compile`] turns the user's selections into one [`Clause`] per
//! active stage, already resolved against the entity's [`FieldMap`]: field
//! names are looked up, numeric filter text is parsed, date bounds are
//! widened to whole days. Evaluating a clause is then a single field lookup
//! and comparison.

use std::cmp::Ordering;

use serde_json::Value;

use crate::field_map::{FieldMap, IdOrName, StatusRule};
use crate::record::Record;
use crate::stage::Stage;
use crate::state::{non_empty, FilterState};
use crate::value::{display_text, parse_integer, Number, Timestamp};

/// Product stock bands selectable through the status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockBand {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockBand {
    /// Parses a status filter value (`out_of_stock`, `low_stock`, `in_stock`).
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "out_of_stock" => Some(StockBand::OutOfStock),
            "low_stock" => Some(StockBand::LowStock),
            "in_stock" => Some(StockBand::InStock),
            _ => None,
        }
    }

    /// Returns `true` if the quantity falls in this band.
    ///
    /// The low band is `0 < q <= threshold`. NaN quantities are in no band.
    pub fn contains(self, quantity: Number, threshold: i64) -> bool {
        let zero = quantity.compare(Number::I64(0));
        let limit = quantity.compare(Number::I64(threshold));
        match self {
            StockBand::OutOfStock => zero == Some(Ordering::Equal),
            StockBand::LowStock => {
                zero == Some(Ordering::Greater)
                    && matches!(limit, Some(Ordering::Less | Ordering::Equal))
            }
            StockBand::InStock => limit == Some(Ordering::Greater),
        }
    }
}

#[derive(Debug, Clone)]
enum Test<'s> {
    Search {
        term: String,
        fields: &'s [String],
    },
    DateRange {
        field: &'s str,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    },
    Flag {
        field: &'s str,
        expected: bool,
    },
    Text {
        field: &'s str,
        expected: &'s str,
    },
    Integer {
        field: &'s str,
        expected: i64,
    },
    Stock {
        field: &'s str,
        band: StockBand,
        threshold: i64,
    },
    IdOrName {
        rule: &'s IdOrName,
        id: Option<i64>,
        name: &'s str,
    },
    Range {
        field: &'s str,
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// One active stage of a compiled predicate.
#[derive(Debug, Clone)]
pub struct Clause<'s> {
    stage: Stage,
    test: Test<'s>,
}

impl<'s> Clause<'s> {
    /// The pipeline stage this clause implements.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Evaluates this clause against one record.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match &self.test {
            Test::Search { term, fields } => matches_search(record, term, *fields),
            Test::DateRange { field, from, to } => {
                let Some(date) = record.lookup(field).and_then(Timestamp::from_json) else {
                    return self.stage.keeps_missing();
                };
                from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
            }
            Test::Flag { field, expected } => {
                record.lookup(field).and_then(Value::as_bool) == Some(*expected)
            }
            Test::Text { field, expected } => {
                record.lookup(field).and_then(Value::as_str) == Some(*expected)
            }
            Test::Integer { field, expected } => record
                .lookup(field)
                .map(Number::from_json)
                .and_then(|n| n.compare(Number::I64(*expected)))
                == Some(Ordering::Equal),
            Test::Stock {
                field,
                band,
                threshold,
            } => record
                .lookup(field)
                .map(Number::from_json)
                .is_some_and(|q| band.contains(q, *threshold)),
            Test::IdOrName { rule, id, name } => {
                let id_match = id.is_some_and(|id| {
                    record
                        .lookup(&rule.id_field)
                        .map(Number::from_json)
                        .and_then(|n| n.compare(Number::I64(id)))
                        == Some(Ordering::Equal)
                });
                id_match
                    || record.lookup(&rule.name_field).and_then(Value::as_str) == Some(*name)
            }
            Test::Range { field, min, max } => {
                let Some(raw) = record.lookup(field) else {
                    return self.stage.keeps_missing();
                };
                let value = Number::from_json(raw);
                let at_least = |bound: f64| {
                    matches!(
                        value.compare(Number::F64(bound)),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                };
                let at_most = |bound: f64| {
                    matches!(
                        value.compare(Number::F64(bound)),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                };
                min.map_or(true, at_least) && max.map_or(true, at_most)
            }
        }
    }
}

/// The conjunction of every active stage for one entity type.
///
/// # Example
///
/// ```
/// use lending_filter::{FieldMap, FilterState, Predicate, Stage};
/// use serde_json::json;
///
/// let map = FieldMap::products();
/// let state = FilterState::new().search("wid").status("out_of_stock");
/// let predicate = Predicate::compile(&map, &state);
///
/// assert_eq!(predicate.stages(), vec![Stage::Search, Stage::Status]);
/// assert!(predicate.matches(&json!({"name": "Widget", "quantity_available": 0})));
/// assert!(!predicate.matches(&json!({"name": "Widget", "quantity_available": 4})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Predicate<'s> {
    clauses: Vec<Clause<'s>>,
}

impl<'s> Predicate<'s> {
    /// Builds the clauses the state activates under the given map.
    ///
    /// A stage is skipped when its state field is empty, or when the map
    /// gives it nothing to read (no date field, no value field, no status
    /// rule, an unrecognised status for a flag or stock rule).
    pub fn compile(map: &'s FieldMap, state: &'s FilterState) -> Self {
        let mut clauses = Vec::new();
        let mut push = |stage: Stage, test: Test<'s>| clauses.push(Clause { stage, test });

        if let Some(term) = non_empty(&state.search) {
            push(
                Stage::Search,
                Test::Search {
                    term: term.to_lowercase(),
                    fields: &map.searchable_fields,
                },
            );
        }

        if state.date_from.is_some() || state.date_to.is_some() {
            if let Some(field) = map.effective_date_field(non_empty(&state.date_field)) {
                push(
                    Stage::DateRange,
                    Test::DateRange {
                        field,
                        from: state.date_from.map(Timestamp::start_of_day),
                        to: state.date_to.map(Timestamp::end_of_day),
                    },
                );
            }
        }

        if let Some(status) = non_empty(&state.status) {
            if let Some(test) = status_test(&map.status, status) {
                push(Stage::Status, test);
            }
        }

        if let (Some(rule), Some(category)) = (&map.category, non_empty(&state.category)) {
            push(Stage::Category, id_or_name(rule, category));
        }

        if let (Some(field), Some(course)) = (&map.course, non_empty(&state.course)) {
            push(
                Stage::Course,
                Test::Text {
                    field,
                    expected: course,
                },
            );
        }

        if let (Some(field), Some(year)) = (&map.year, state.year) {
            push(
                Stage::Year,
                Test::Integer {
                    field,
                    expected: year,
                },
            );
        }

        if let (Some(field), Some(expected)) = (&map.returnable, state.is_returnable.as_bool()) {
            push(Stage::Returnable, Test::Flag { field, expected });
        }

        if let (Some(rule), Some(lender)) = (&map.lender, non_empty(&state.lender)) {
            push(Stage::Lender, id_or_name(rule, lender));
        }

        if state.min_value.is_some() || state.max_value.is_some() {
            if let Some(field) = map.value_field.as_deref() {
                push(
                    Stage::ValueRange,
                    Test::Range {
                        field,
                        min: state.min_value,
                        max: state.max_value,
                    },
                );
            }
        }

        Predicate { clauses }
    }

    /// Active clauses in pipeline order.
    pub fn clauses(&self) -> &[Clause<'s>] {
        &self.clauses
    }

    /// Stages that will run, in pipeline order.
    pub fn stages(&self) -> Vec<Stage> {
        self.clauses.iter().map(Clause::stage).collect()
    }

    /// Returns `true` if no stage is active; the predicate matches everything.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Tests one record against every active clause.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

fn status_test<'s>(rule: &'s StatusRule, status: &'s str) -> Option<Test<'s>> {
    match rule {
        StatusRule::Disabled => None,
        StatusRule::ActiveFlag { field } => {
            let expected = match status {
                "active" => true,
                "inactive" => false,
                _ => return None,
            };
            Some(Test::Flag { field, expected })
        }
        StatusRule::Equals { field } => Some(Test::Text {
            field,
            expected: status,
        }),
        StatusRule::StockLevel {
            field,
            low_stock_threshold,
        } => StockBand::from_status(status).map(|band| Test::Stock {
            field,
            band,
            threshold: *low_stock_threshold,
        }),
    }
}

fn id_or_name<'s>(rule: &'s IdOrName, text: &'s str) -> Test<'s> {
    Test::IdOrName {
        rule,
        id: parse_integer(text),
        name: text,
    }
}

fn matches_search<R, S>(record: &R, term: &str, fields: &[S]) -> bool
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    fields.iter().any(|field| {
        record
            .lookup(field.as_ref())
            .and_then(display_text)
            .is_some_and(|text| text.to_lowercase().contains(term))
    })
}

/// Case-insensitive substring search over the given fields.
///
/// Keeps a record when any field, if present, contains `term`. An empty term
/// keeps everything. Input order is preserved.
///
/// ```
/// use lending_filter::search_records;
/// use serde_json::json;
///
/// let records = vec![json!({"name": "Widget"}), json!({"name": "Gadget"})];
/// let found = search_records(&records, "WID", &["name"]);
/// assert_eq!(found, vec![&records[0]]);
/// ```
pub fn search_records<'a, R, S>(records: &'a [R], term: &str, fields: &[S]) -> Vec<&'a R>
where
    R: Record,
    S: AsRef<str>,
{
    if term.is_empty() {
        return records.iter().collect();
    }
    let term = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_search(*record, &term, fields))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stock_bands() {
        let q = |n: i64| Number::I64(n);
        assert!(StockBand::OutOfStock.contains(q(0), 10));
        assert!(!StockBand::OutOfStock.contains(q(1), 10));
        assert!(StockBand::LowStock.contains(q(1), 10));
        assert!(StockBand::LowStock.contains(q(10), 10));
        assert!(!StockBand::LowStock.contains(q(11), 10));
        assert!(!StockBand::LowStock.contains(q(0), 10));
        assert!(StockBand::InStock.contains(q(11), 10));
        assert!(!StockBand::InStock.contains(q(10), 10));
        assert!(!StockBand::InStock.contains(Number::NAN, 10));
    }

    #[test]
    fn empty_state_compiles_to_nothing() {
        let state = FilterState::new();
        for map in [FieldMap::products(), FieldMap::students(), FieldMap::orders()] {
            assert!(Predicate::compile(&map, &state).is_empty());
        }
    }

    #[test]
    fn stages_follow_pipeline_order() {
        let map = FieldMap::products();
        let state = FilterState::new()
            .max_value(50.0)
            .is_returnable(true)
            .category("2")
            .status("in_stock")
            .date_to(date(2024, 1, 1))
            .search("pen");
        assert_eq!(
            Predicate::compile(&map, &state).stages(),
            vec![
                Stage::Search,
                Stage::DateRange,
                Stage::Status,
                Stage::Category,
                Stage::Returnable,
                Stage::ValueRange
            ]
        );
    }

    #[test]
    fn entity_specific_fields_are_ignored_elsewhere() {
        let state = FilterState::new()
            .course("BSc")
            .year(2)
            .category("1")
            .lender("3")
            .is_returnable(false);

        assert_eq!(
            Predicate::compile(&FieldMap::products(), &state).stages(),
            vec![Stage::Category, Stage::Returnable]
        );
        assert_eq!(
            Predicate::compile(&FieldMap::students(), &state).stages(),
            vec![Stage::Course, Stage::Year]
        );
        assert_eq!(
            Predicate::compile(&FieldMap::orders(), &state).stages(),
            vec![Stage::Lender]
        );
        assert!(Predicate::compile(&FieldMap::fallback(), &state).is_empty());
    }

    #[test]
    fn unrecognised_flag_status_is_not_a_stage() {
        let state = FilterState::new().status("graduated");
        assert!(Predicate::compile(&FieldMap::students(), &state).is_empty());
        assert!(Predicate::compile(&FieldMap::products(), &state).is_empty());
        // orders compare verbatim, so any status is a stage
        assert_eq!(
            Predicate::compile(&FieldMap::orders(), &state).stages(),
            vec![Stage::Status]
        );
    }

    #[test]
    fn search_stringifies_numbers_and_skips_missing() {
        let map = FieldMap::students();
        let state = FilterState::new().search("2041");
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"name": "Ravi", "student_id": 20415})));
        assert!(!predicate.matches(&json!({"name": "Ravi"})));
        assert!(!predicate.matches(&json!({"name": "Ravi", "student_id": null})));
    }

    #[test]
    fn search_follows_dotted_paths() {
        let map = FieldMap {
            searchable_fields: vec!["student.name".into(), "notes".into()],
            ..FieldMap::default()
        };
        let state = FilterState::new().search("MEERA");
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"student": {"name": "Meera K"}})));
        assert!(!predicate.matches(&json!({"student": "Meera K"})));
        assert!(!predicate.matches(&json!({"notes": "for Ravi"})));
    }

    #[test]
    fn date_range_excludes_unparseable_and_missing() {
        let map = FieldMap::orders();
        let state = FilterState::new().date_from(date(2024, 1, 1));
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"lending_date": "2024-01-01T00:00:00Z"})));
        assert!(!predicate.matches(&json!({"lending_date": "2023-12-31T23:59:59.999Z"})));
        assert!(!predicate.matches(&json!({"lending_date": "soon"})));
        assert!(!predicate.matches(&json!({"created_at": "2024-02-01"})));
    }

    #[test]
    fn date_range_uses_requested_field() {
        let map = FieldMap::orders();
        let state = FilterState::new()
            .date_field("actual_return_date")
            .date_to(date(2024, 1, 31));
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({
            "lending_date": "2024-03-01",
            "actual_return_date": "2024-01-31 18:30:00"
        })));
        assert!(!predicate.matches(&json!({
            "lending_date": "2024-01-01",
            "actual_return_date": "2024-02-01"
        })));
    }

    #[test]
    fn date_range_without_any_field_is_skipped() {
        let state = FilterState::new().date_from(date(2024, 1, 1));
        assert!(Predicate::compile(&FieldMap::fallback(), &state).is_empty());
    }

    #[test]
    fn student_status_reads_flag() {
        let map = FieldMap::students();
        let inactive = FilterState::new().status("inactive");
        let predicate = Predicate::compile(&map, &inactive);
        assert!(predicate.matches(&json!({"is_active": false})));
        assert!(!predicate.matches(&json!({"is_active": true})));
        assert!(!predicate.matches(&json!({"name": "no flag"})));
        assert!(!predicate.matches(&json!({"is_active": "false"})));
    }

    #[test]
    fn category_matches_id_or_name() {
        let map = FieldMap::products();
        let by_id = FilterState::new().category("4");
        let by_name = FilterState::new().category("Lab Equipment");
        let record = json!({"category_id": 4, "category_name": "Lab Equipment"});
        let other = json!({"category_id": 5, "category_name": "Stationery"});

        assert!(Predicate::compile(&map, &by_id).matches(&record));
        assert!(!Predicate::compile(&map, &by_id).matches(&other));
        assert!(Predicate::compile(&map, &by_name).matches(&record));
        assert!(!Predicate::compile(&map, &by_name).matches(&other));
    }

    #[test]
    fn lender_id_as_string_column() {
        let map = FieldMap::orders();
        let state = FilterState::new().lender("12");
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"lender_id": "12"})));
        assert!(predicate.matches(&json!({"lender_id": 12, "lender_name": "Stores"})));
        assert!(!predicate.matches(&json!({"lender_name": "Stores"})));
    }

    #[test]
    fn year_compares_as_integer() {
        let map = FieldMap::students();
        let state = FilterState::new().year(2);
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"year_of_study": 2})));
        assert!(predicate.matches(&json!({"year_of_study": "2"})));
        assert!(!predicate.matches(&json!({"year_of_study": 3})));
        assert!(!predicate.matches(&json!({})));
    }

    #[test]
    fn course_is_exact() {
        let map = FieldMap::students();
        let state = FilterState::new().course("BSc Physics");
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"course": "BSc Physics"})));
        assert!(!predicate.matches(&json!({"course": "bsc physics"})));
        assert!(!predicate.matches(&json!({"course": "BSc"})));
    }

    #[test]
    fn returnable_flag() {
        let map = FieldMap::products();
        let state = FilterState::new().is_returnable(false);
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"is_returnable": false})));
        assert!(!predicate.matches(&json!({"is_returnable": true})));
        assert!(!predicate.matches(&json!({})));
    }

    #[test]
    fn value_range_keeps_unpriced_records() {
        let map = FieldMap::products();
        let state = FilterState::new().min_value(10.0).max_value(20.0);
        let predicate = Predicate::compile(&map, &state);
        assert!(predicate.matches(&json!({"name": "no price"})));
        assert!(predicate.matches(&json!({"unit_price": null})));
        assert!(predicate.matches(&json!({"unit_price": "10.00"})));
        assert!(predicate.matches(&json!({"unit_price": 20})));
        assert!(!predicate.matches(&json!({"unit_price": 20.01})));
        assert!(!predicate.matches(&json!({"unit_price": "n/a"})));
    }

    #[test]
    fn nan_bound_matches_no_priced_record() {
        let map = FieldMap::orders();
        let state = FilterState::new().min_value(f64::NAN);
        let predicate = Predicate::compile(&map, &state);
        assert!(!predicate.matches(&json!({"total_value": 0})));
        assert!(!predicate.matches(&json!({"total_value": 1e9})));
        assert!(predicate.matches(&json!({"order_number": "ORD-1"})));
    }

    #[test]
    fn search_records_helper() {
        let records = vec![
            json!({"name": "Beaker", "sku": "LAB-100"}),
            json!({"name": "Stapler", "sku": "OFF-200"}),
            json!({"name": "Flask", "sku": "LAB-101"}),
        ];
        let found = search_records(&records, "lab", &["name", "sku"]);
        assert_eq!(found, vec![&records[0], &records[2]]);
        assert_eq!(search_records(&records, "", &["name"]).len(), 3);
        assert!(search_records(&records, "lab", &["name"]).is_empty());
    }
}
