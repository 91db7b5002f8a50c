//! Array and tuple validation.
//!
//! This module provides the array combinator (one validator for every item)
//! and the tuple family (one validator per position). Items are validated
//! in index order and the first failure stops the walk; its index is
//! reported as `"[i]: message"` and as an `Index(i)` path segment.

use crate::error::ValidationError;
use crate::metadata::{Inner, Metadata, SchemaRef};
use crate::value::Value;

use super::traits::Validate;
use super::Schema;

pub(crate) const EXPECTED_ARRAY: &str = "Expected array";

/// Returns the input's items or the array type-mismatch error.
pub(crate) fn expect_array(input: &Value) -> Result<&Vec<Value>, ValidationError> {
    input
        .as_array()
        .ok_or_else(|| ValidationError::invalid_type(EXPECTED_ARRAY))
}

/// How a tuple treats items beyond its declared positions.
#[derive(Clone)]
pub(crate) enum TupleRest<S> {
    /// Length must match exactly.
    Exact,
    /// At least the declared length; extras are dropped.
    Loose,
    /// At least the declared length; extras are validated and kept.
    Rest(S),
}

/// Checks a tuple's length against its declared arity.
pub(crate) fn check_tuple_len<S>(
    rest: &TupleRest<S>,
    expected: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    let message = match rest {
        TupleRest::Exact if actual != expected => {
            format!("Expected {} items, got {}", expected, actual)
        }
        TupleRest::Loose | TupleRest::Rest(_) if actual < expected => {
            format!("Expected at least {} items, got {}", expected, actual)
        }
        _ => return Ok(()),
    };
    Err(ValidationError::new(message).with_code("invalid_length"))
}

/// Builds the tuple metadata shared by the sync and async variants.
pub(crate) fn tuple_metadata<R: Into<SchemaRef> + Clone>(
    items: &[R],
    rest: &TupleRest<R>,
) -> Metadata {
    let kind = match rest {
        TupleRest::Exact => "tuple",
        TupleRest::Loose => "loose_tuple",
        TupleRest::Rest(_) => "tuple_with_rest",
    };
    let rest = match rest {
        TupleRest::Rest(schema) => Some(Box::new(schema.clone().into())),
        _ => None,
    };
    Metadata::new(kind).with_inner(Inner::Items {
        items: items.iter().cloned().map(Into::into).collect(),
        rest,
    })
}

/// Validates every item of an array against one schema.
struct ArraySchema {
    item: Schema,
}

impl Validate for ArraySchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let items = expect_array(input)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.item.parse(item).map_err(|e| e.at_index(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Validates an array position by position.
struct TupleSchema {
    items: Vec<Schema>,
    rest: TupleRest<Schema>,
}

impl Validate for TupleSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let values = expect_array(input)?;
        check_tuple_len(&self.rest, self.items.len(), values.len())?;

        let mut output = Vec::with_capacity(values.len());
        for (index, (schema, value)) in self.items.iter().zip(values).enumerate() {
            output.push(schema.parse(value).map_err(|e| e.at_index(index))?);
        }

        if let TupleRest::Rest(rest) = &self.rest {
            for (index, value) in values.iter().enumerate().skip(self.items.len()) {
                output.push(rest.parse(value).map_err(|e| e.at_index(index))?);
            }
        }
        Ok(Value::Array(output))
    }
}

fn tuple(items: Vec<Schema>, rest: TupleRest<Schema>) -> Schema {
    let metadata = tuple_metadata(&items, &rest);
    Schema::build(TupleSchema { items, rest }, metadata)
}

impl Schema {
    /// Validates every item against `item`, producing a new array.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    /// use serde_json::json;
    ///
    /// let numbers = Schema::array(Schema::number());
    /// assert!(numbers.parse(&Value::from(json!([1, 2, 3]))).is_ok());
    ///
    /// let err = numbers.parse(&Value::from(json!([1, "x", 3]))).unwrap_err();
    /// assert_eq!(err.message(), "[1]: Expected number");
    /// ```
    pub fn array(item: Schema) -> Schema {
        let metadata = Metadata::wrap("array", &item, None);
        Schema::build(ArraySchema { item }, metadata)
    }

    /// Validates a fixed-length array position by position.
    ///
    /// Fails with `"Expected N items, got M"` on a length mismatch.
    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
        tuple(items.into_iter().collect(), TupleRest::Exact)
    }

    /// Like [`Schema::tuple`] but accepts extra items and drops them.
    ///
    /// Fails with `"Expected at least N items, got M"` when too short.
    pub fn loose_tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
        tuple(items.into_iter().collect(), TupleRest::Loose)
    }

    /// Like [`Schema::tuple`] but validates extra items against `rest` and
    /// keeps them.
    pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
        tuple(items.into_iter().collect(), TupleRest::Rest(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_array_rejects_non_array() {
        let err = Schema::array(Schema::string())
            .parse(&v(json!({"0": "a"})))
            .unwrap_err();
        assert_eq!(err.message(), "Expected array");
    }

    #[test]
    fn test_array_maps_items() {
        let doubled = Schema::from_fn(|input: &Value| match input.as_f64() {
            Some(n) => Ok(Value::from(n * 2.0)),
            None => Err("Expected number"),
        });
        let out = Schema::array(doubled).parse(&v(json!([1, 2, 3]))).unwrap();
        assert_eq!(out, v(json!([2, 4, 6])));
    }

    #[test]
    fn test_array_reports_index_path() {
        let schema = Schema::array(Schema::number());
        let err = schema.parse(&v(json!([1, "x", 3]))).unwrap_err();
        assert_eq!(err.message(), "[1]: Expected number");
        assert_eq!(err.issues().first().path.to_string(), "[1]");
    }

    #[test]
    fn test_tuple_exact_length() {
        let schema = Schema::tuple([Schema::string(), Schema::number()]);
        assert_eq!(
            schema.parse(&v(json!(["hello", 42]))).unwrap(),
            v(json!(["hello", 42]))
        );
        assert_eq!(
            schema.parse(&v(json!(["hello"]))).unwrap_err().message(),
            "Expected 2 items, got 1"
        );
        assert_eq!(
            schema.parse(&v(json!(["hello", 1, 2]))).unwrap_err().message(),
            "Expected 2 items, got 3"
        );
    }

    #[test]
    fn test_tuple_position_error() {
        let schema = Schema::tuple([Schema::string(), Schema::number()]);
        let err = schema.parse(&v(json!(["hello", "world"]))).unwrap_err();
        assert_eq!(err.message(), "[1]: Expected number");
    }

    #[test]
    fn test_loose_tuple_drops_extras() {
        let schema = Schema::loose_tuple([Schema::string()]);
        assert_eq!(schema.parse(&v(json!(["a", 1, true]))).unwrap(), v(json!(["a"])));
        assert_eq!(
            schema.parse(&v(json!([]))).unwrap_err().message(),
            "Expected at least 1 items, got 0"
        );
    }

    #[test]
    fn test_tuple_with_rest_keeps_all() {
        let schema = Schema::tuple_with_rest([Schema::string()], Schema::number());
        assert_eq!(
            schema.parse(&v(json!(["a", 1, 2]))).unwrap(),
            v(json!(["a", 1, 2]))
        );
        let err = schema.parse(&v(json!(["a", 1, "b"]))).unwrap_err();
        assert_eq!(err.message(), "[2]: Expected number");
        assert_eq!(err.issues().first().path.to_string(), "[2]");
    }

    #[test]
    fn test_tuple_metadata() {
        let schema = Schema::tuple_with_rest([Schema::string()], Schema::number());
        let meta = schema.metadata().unwrap();
        assert_eq!(meta.kind, "tuple_with_rest");
        match meta.inner {
            Some(Inner::Items { items, rest }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(rest.unwrap().kind().as_deref(), Some("number"));
            }
            other => panic!("unexpected inner: {:?}", other),
        }
    }
}
