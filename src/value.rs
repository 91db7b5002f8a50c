//! The dynamic value model validated by every schema.
//!
//! [`Value`] extends the JSON data model with the three shapes a dynamic
//! runtime distinguishes but JSON cannot express: an `Undefined` marker for
//! absent data, and ordered `Map`/`Set` containers whose keys are arbitrary
//! values.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Number;

/// An untyped input or output value.
///
/// Objects keep their insertion order so that validation walks keys in a
/// deterministic order.
///
/// # Example
///
/// ```rust
/// use assay::Value;
/// use serde_json::json;
///
/// let value = Value::from(json!({"name": "Ada", "tags": ["x"]}));
/// assert_eq!(value.type_name(), "object");
/// assert!(value.get("missing").is_undefined());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent data: a missing key, a missing item, or an explicit hole.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// Ordered key/value entries with arbitrary keys.
    Map(Vec<(Value, Value)>),
    /// Ordered unique values.
    Set(Vec<Value>),
}

/// The shared `Undefined` returned by lookups that miss.
static UNDEFINED: Value = Value::Undefined;

impl Value {
    /// Builds a `Map` from entries. Later duplicate keys overwrite earlier ones.
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (key, value) in entries {
            insert_entry(&mut out, key, value);
        }
        Value::Map(out)
    }

    /// Builds a `Set` from items, dropping duplicates.
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            insert_unique(&mut out, item);
        }
        Value::Set(out)
    }

    /// Returns the runtime type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `null` and `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Vec<(Value, Value)>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up an object key, yielding `Undefined` when absent or when
    /// `self` is not an object.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Object(fields) => fields.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Looks up an array position, yielding `Undefined` when out of range.
    pub fn at(&self, index: usize) -> &Value {
        match self {
            Value::Array(items) => items.get(index).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Converts to `serde_json::Value`.
    ///
    /// Integral numbers become JSON integers, non-finite numbers and
    /// `Undefined` become `null`, and `Map`/`Set` become `{}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(_) | Value::Set(_) => serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Renders the value as JSON text for use inside error messages.
    pub fn render(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            other => other.to_json().to_string(),
        }
    }

    /// Renders a value used as a key: strings appear bare, everything else
    /// as JSON text.
    pub fn render_key(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.render(),
        }
    }
}

/// Inserts or overwrites a map entry, keeping first-insertion order.
pub(crate) fn insert_entry(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

/// Appends `item` unless an equal value is already present.
pub(crate) fn insert_unique(items: &mut Vec<Value>, item: Value) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        serde_json::Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from(value.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let value = Value::from(json!({"b": 1, "a": [true, null]}));
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(value.get("b"), &Value::Number(1.0));
        assert_eq!(value.get("a").at(0), &Value::Bool(true));
        assert!(value.get("a").at(1).is_null());
        assert!(value.get("a").at(2).is_undefined());
    }

    #[test]
    fn test_get_missing_is_undefined() {
        let value = Value::from(json!({"a": null}));
        assert!(value.get("a").is_null());
        assert!(value.get("b").is_undefined());
        assert!(Value::Null.get("a").is_undefined());
    }

    #[test]
    fn test_render_integral_numbers() {
        assert_eq!(Value::Number(1.0).render(), "1");
        assert_eq!(Value::Number(1.5).render(), "1.5");
        assert_eq!(Value::from("a").render(), "\"a\"");
        assert_eq!(Value::Undefined.render(), "undefined");
    }

    #[test]
    fn test_render_key() {
        assert_eq!(Value::from("k").render_key(), "k");
        assert_eq!(Value::Number(3.0).render_key(), "3");
        assert_eq!(Value::Bool(true).render_key(), "true");
    }

    #[test]
    fn test_map_overwrites_duplicate_keys() {
        let map = Value::map(vec![
            (Value::from("a"), Value::from(1)),
            (Value::from("b"), Value::from(2)),
            (Value::from("a"), Value::from(3)),
        ]);
        let entries = map.as_map().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Value::from("a"), Value::from(3)));
    }

    #[test]
    fn test_set_drops_duplicates() {
        let set = Value::set(vec![Value::from(1), Value::from(2), Value::from(1)]);
        assert_eq!(set.as_set().unwrap().len(), 2);
    }

    #[test]
    fn test_to_json_skips_undefined_fields() {
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), Value::Undefined);
        fields.insert("b".to_string(), Value::from(true));
        assert_eq!(Value::Object(fields).to_json(), json!({"b": true}));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Undefined.type_name(), "undefined");
        assert_eq!(Value::map(vec![]).type_name(), "Map");
        assert_eq!(Value::set(vec![]).type_name(), "Set");
    }
}
