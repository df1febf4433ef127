//! Field access over loosely typed records.
//!
//! The engine never validates a record's schema. It only needs to look a
//! field up by name, and [`Record`] is the one seam it goes through to do so.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

/// A record the engine can filter: one product, student or order.
///
/// Implementations exist for the JSON shapes the data layer hands out:
/// [`serde_json::Value`] objects, [`serde_json::Map`], and string-keyed
/// `HashMap`/`BTreeMap` of JSON values.
///
/// # Manual Implementation
///
/// ```
/// use lending_filter::Record;
/// use serde_json::{json, Value};
///
/// struct Row {
///     columns: Vec<(String, Value)>,
/// }
///
/// impl Record for Row {
///     fn field(&self, name: &str) -> Option<&Value> {
///         self.columns.iter().find(|(k, _)| k == name).map(|(_, v)| v)
///     }
/// }
///
/// let row = Row { columns: vec![("name".into(), json!("Widget"))] };
/// assert_eq!(row.lookup("name"), Some(&json!("Widget")));
/// ```
pub trait Record {
    /// Returns the top-level field with the given name, if present.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Resolves a possibly dotted path (`student.name`).
    ///
    /// The first segment goes through [`Record::field`]; each following
    /// segment indexes into a nested JSON object. Any missing segment, or a
    /// segment that lands on a non-object, resolves to `None`. Explicit JSON
    /// `null` also resolves to `None` so that every stage sees a single
    /// notion of "absent".
    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.field(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_object()?.get(name)
    }
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<&Value> {
        (**self).field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_lookup() {
        let record = json!({"name": "Widget", "quantity_available": 3});
        assert_eq!(record.lookup("name"), Some(&json!("Widget")));
        assert_eq!(record.lookup("missing"), None);
    }

    #[test]
    fn dotted_path_lookup() {
        let record = json!({"student": {"name": "Asha", "contact": {"email": "a@x.edu"}}});
        assert_eq!(record.lookup("student.name"), Some(&json!("Asha")));
        assert_eq!(
            record.lookup("student.contact.email"),
            Some(&json!("a@x.edu"))
        );
        assert_eq!(record.lookup("student.phone"), None);
        assert_eq!(record.lookup("student.name.first"), None);
    }

    #[test]
    fn null_is_absent() {
        let record = json!({"total_value": null});
        assert_eq!(record.field("total_value"), Some(&Value::Null));
        assert_eq!(record.lookup("total_value"), None);
    }

    #[test]
    fn non_object_value_has_no_fields() {
        assert_eq!(json!([1, 2]).lookup("0"), None);
        assert_eq!(json!("text").lookup("len"), None);
    }

    #[test]
    fn map_impls_agree() {
        let mut hash = HashMap::new();
        hash.insert("course".to_string(), json!("BSc"));
        let mut tree = BTreeMap::new();
        tree.insert("course".to_string(), json!("BSc"));

        assert_eq!(hash.lookup("course"), Some(&json!("BSc")));
        assert_eq!(tree.lookup("course"), Some(&json!("BSc")));
        assert_eq!((&tree).lookup("course"), Some(&json!("BSc")));
    }
}
