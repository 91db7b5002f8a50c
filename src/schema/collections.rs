//! Map and set validation.
//!
//! Both containers are walked in input order and stop at the first failing
//! entry. Outputs are freshly built containers, so a key or item that
//! validates to an equal value collapses into one entry.

use crate::error::ValidationError;
use crate::metadata::{Inner, Metadata, SchemaRef};
use crate::path::PathSegment;
use crate::value::{insert_entry, insert_unique, Value};

use super::traits::Validate;
use super::Schema;

pub(crate) const EXPECTED_MAP: &str = "Expected Map";
pub(crate) const EXPECTED_SET: &str = "Expected Set";

pub(crate) fn expect_map(input: &Value) -> Result<&Vec<(Value, Value)>, ValidationError> {
    input
        .as_map()
        .ok_or_else(|| ValidationError::invalid_type(EXPECTED_MAP))
}

pub(crate) fn expect_set(input: &Value) -> Result<&Vec<Value>, ValidationError> {
    input
        .as_set()
        .ok_or_else(|| ValidationError::invalid_type(EXPECTED_SET))
}

/// `Map key: message`, attributed to the rendered key.
pub(crate) fn map_key_error(error: ValidationError, key: &Value) -> ValidationError {
    error.within(PathSegment::field(key.render_key()), "Map key: ")
}

/// `Map[K]: message`, attributed to the rendered key.
pub(crate) fn map_value_error(error: ValidationError, key: &Value) -> ValidationError {
    let key = key.render_key();
    let prefix = format!("Map[{}]: ", key);
    error.within(PathSegment::field(key), prefix)
}

/// `Set[i]: message`, attributed to the iteration index.
pub(crate) fn set_item_error(error: ValidationError, index: usize) -> ValidationError {
    error.within(PathSegment::index(index), format!("Set[{}]: ", index))
}

pub(crate) fn map_metadata(key: impl Into<SchemaRef>, value: impl Into<SchemaRef>) -> Metadata {
    Metadata::new("map").with_inner(Inner::Entry {
        key: Box::new(key.into()),
        value: Box::new(value.into()),
    })
}

struct MapSchema {
    key: Schema,
    value: Schema,
}

impl Validate for MapSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let entries = expect_map(input)?;
        let mut output = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let parsed_key = self.key.parse(key).map_err(|e| map_key_error(e, key))?;
            let parsed_value = self
                .value
                .parse(value)
                .map_err(|e| map_value_error(e, key))?;
            insert_entry(&mut output, parsed_key, parsed_value);
        }
        Ok(Value::Map(output))
    }
}

struct SetSchema {
    item: Schema,
}

impl Validate for SetSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let items = expect_set(input)?;
        let mut output = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let parsed = self
                .item
                .parse(item)
                .map_err(|e| set_item_error(e, index))?;
            insert_unique(&mut output, parsed);
        }
        Ok(Value::Set(output))
    }
}

impl Schema {
    /// Validates the keys and values of a [`Value::Map`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let ages = Schema::map(Schema::string(), Schema::number());
    /// let input = Value::map([(Value::from("ann"), Value::from("old"))]);
    ///
    /// assert_eq!(
    ///     ages.parse(&input).unwrap_err().message(),
    ///     "Map[ann]: Expected number"
    /// );
    /// ```
    pub fn map(key: Schema, value: Schema) -> Schema {
        let metadata = map_metadata(&key, &value);
        Schema::build(MapSchema { key, value }, metadata)
    }

    /// Validates every item of a [`Value::Set`].
    pub fn set(item: Schema) -> Schema {
        let metadata = Metadata::wrap("set", &item, None);
        Schema::build(SetSchema { item }, metadata)
    }
}
