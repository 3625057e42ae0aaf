//! Field extraction from validated input records.
//!
//! These helpers run after [`crate::validate::validate`] has accepted a
//! record, so type failures here indicate a key outside the rule table.

use serde_json::{Map, Value};
use tracing::debug;

use super::Graph;
use crate::error::{Result, TdbError};
use crate::validate::checks::{real_vector, type_name};

/// A plain input record.
pub type Record = Map<String, Value>;

/// The map behind a record value, if it is one.
pub(crate) fn as_record(value: Option<&Value>) -> Option<&Record> {
    value.and_then(Value::as_object)
}

/// Optional real number.
pub(crate) fn number(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

/// Mandatory real number.
pub(crate) fn required_number(record: &Record, kind: &str, key: &str) -> Result<f64> {
    number(record, key).ok_or_else(|| TdbError::missing_keys(kind, [key]))
}

/// Optional string.
pub(crate) fn text(record: &Record, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Mandatory string.
pub(crate) fn required_text(record: &Record, kind: &str, key: &str) -> Result<String> {
    text(record, key).ok_or_else(|| TdbError::missing_keys(kind, [key]))
}

/// Optional two-row matrix.
pub(crate) fn graph(record: &Record, kind: &str, key: &str) -> Result<Option<Graph>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Graph::from_value(value, kind, key).map(Some),
    }
}

/// Mandatory two-row matrix.
pub(crate) fn required_graph(record: &Record, kind: &str, key: &str) -> Result<Graph> {
    graph(record, kind, key)?.ok_or_else(|| TdbError::missing_keys(kind, [key]))
}

/// Optional real vector.
pub(crate) fn vector(record: &Record, kind: &str, key: &str) -> Result<Option<Vec<f64>>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => real_vector(value)
            .map(Some)
            .map_err(|message| TdbError::type_mismatch(kind, key, message)),
    }
}

/// The records of a child collection.
///
/// A lone map is wrapped into a one-element sequence so every collection is
/// built by [`build_collection`].
pub(crate) fn children<'a>(record: &'a Record, parent: &str, key: &str) -> Result<&'a [Value]> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(single @ Value::Object(_)) => Ok(std::slice::from_ref(single)),
        Some(other) => Err(TdbError::type_mismatch(
            parent,
            key,
            format!("expected a record or a sequence of records, got {}", type_name(other)),
        )),
    }
}

/// Build every element of a child collection.
///
/// `build` returns `Ok(None)` for an absent or empty element, which is
/// skipped. A failing element is reported with its position.
pub(crate) fn build_collection<T, F>(items: &[Value], parent: &str, collection: &str, build: F) -> Result<Vec<T>>
where
    F: Fn(&Value) -> Result<Option<T>>,
{
    let mut built = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match build(item) {
            Ok(Some(entity)) => built.push(entity),
            Ok(None) => {}
            Err(e) => return Err(e.at_index(parent, collection, index)),
        }
    }
    debug!(parent, collection, count = built.len(), "built child collection");
    Ok(built)
}
