//! Object, record, partial and required validation.
//!
//! Object schemas validate declared keys in declaration order and fail on
//! the first invalid field, reported as `"key: message"`. What happens to
//! undeclared keys depends on the variant:
//!
//! - [`Schema::object`] drops them from the output
//! - [`Schema::loose_object`] copies them through unchanged
//! - [`Schema::object_with_rest`] validates them against a shared schema

use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::metadata::{Inner, Metadata, SchemaRef};
use crate::path::PathSegment;
use crate::value::Value;

use super::traits::Validate;
use super::Schema;

pub(crate) const EXPECTED_OBJECT: &str = "Expected object";

/// Returns the input's fields or the object type-mismatch error.
pub(crate) fn expect_object(input: &Value) -> Result<&IndexMap<String, Value>, ValidationError> {
    input
        .as_object()
        .ok_or_else(|| ValidationError::invalid_type(EXPECTED_OBJECT))
}

/// What an object schema does with keys it does not declare.
#[derive(Clone)]
pub(crate) enum UnknownKeys<S> {
    Strip,
    Passthrough,
    Rest(S),
}

impl<S> UnknownKeys<S> {
    fn kind(&self) -> &'static str {
        match self {
            UnknownKeys::Strip => "object",
            UnknownKeys::Passthrough => "loose_object",
            UnknownKeys::Rest(_) => "object_with_rest",
        }
    }
}

/// Builds the object metadata shared by the sync and async variants.
pub(crate) fn object_metadata<R: Into<SchemaRef> + Clone>(
    fields: &IndexMap<String, R>,
    unknown: &UnknownKeys<R>,
) -> Metadata {
    let rest = match unknown {
        UnknownKeys::Rest(schema) => Some(Box::new(schema.clone().into())),
        _ => None,
    };
    Metadata::new(unknown.kind()).with_inner(Inner::Shape {
        fields: fields
            .iter()
            .map(|(k, s)| (k.clone(), s.clone().into()))
            .collect(),
        rest,
    })
}

/// The starting output for an object: a copy of the input for passthrough
/// objects, empty otherwise.
pub(crate) fn initial_output<S>(
    unknown: &UnknownKeys<S>,
    input: &IndexMap<String, Value>,
) -> IndexMap<String, Value> {
    match unknown {
        UnknownKeys::Passthrough => input.clone(),
        _ => IndexMap::with_capacity(input.len()),
    }
}

/// Stores a validated declared field. A key absent from the input stays
/// absent unless its schema produced a value.
pub(crate) fn insert_field(
    output: &mut IndexMap<String, Value>,
    input: &IndexMap<String, Value>,
    key: &str,
    parsed: Value,
) {
    if input.contains_key(key) || !parsed.is_undefined() {
        output.insert(key.to_string(), parsed);
    }
}

/// Fails with `"key: Required"` for the first `undefined` field.
fn check_required(output: &Value) -> Result<(), ValidationError> {
    if let Value::Object(fields) = output {
        if let Some((key, _)) = fields.iter().find(|(_, v)| v.is_undefined()) {
            return Err(ValidationError::new("Required")
                .with_code("required")
                .at_key(key.as_str()));
        }
    }
    Ok(())
}

/// Settles a `required` result. A successful output must hold no
/// `undefined` field; a failure is reported as `"key: Required"` when the
/// input itself held an `undefined` field.
pub(crate) fn settle_required(
    input: &Value,
    parsed: Result<Value, ValidationError>,
) -> Result<Value, ValidationError> {
    match parsed {
        Ok(output) => {
            check_required(&output)?;
            Ok(output)
        }
        Err(error) => {
            check_required(input)?;
            Err(error)
        }
    }
}

/// Attributes a record key failure: `Invalid key "K": message`.
pub(crate) fn invalid_key(error: ValidationError, key: &str) -> ValidationError {
    error.within(PathSegment::field(key), format!("Invalid key \"{}\": ", key))
}

/// Converts a validated record key back into an object key.
pub(crate) fn record_key(parsed: &Value) -> String {
    parsed.render_key()
}

struct ObjectSchema {
    fields: IndexMap<String, Schema>,
    unknown: UnknownKeys<Schema>,
}

impl Validate for ObjectSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let object = expect_object(input)?;
        let mut output = initial_output(&self.unknown, object);

        for (key, schema) in &self.fields {
            let parsed = schema
                .parse(input.get(key))
                .map_err(|e| e.at_key(key.as_str()))?;
            insert_field(&mut output, object, key, parsed);
        }

        if let UnknownKeys::Rest(rest) = &self.unknown {
            for (key, value) in object {
                if self.fields.contains_key(key) {
                    continue;
                }
                let parsed = rest.parse(value).map_err(|e| e.at_key(key.as_str()))?;
                output.insert(key.clone(), parsed);
            }
        }

        Ok(Value::Object(output))
    }
}

/// Validates every key and value of a plain object.
struct RecordSchema {
    key: Schema,
    value: Schema,
}

impl Validate for RecordSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let object = expect_object(input)?;
        let mut output = IndexMap::with_capacity(object.len());

        for (key, value) in object {
            let parsed_key = self
                .key
                .parse(&Value::String(key.clone()))
                .map_err(|e| invalid_key(e, key))?;
            let parsed_value = self.value.parse(value).map_err(|e| e.at_key(key.as_str()))?;
            output.insert(record_key(&parsed_key), parsed_value);
        }

        Ok(Value::Object(output))
    }
}

/// Accepts any plain object, preferring the wrapped schema's output.
struct PartialSchema {
    inner: Schema,
}

impl Validate for PartialSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let object = expect_object(input)?;
        match self.inner.parse(input) {
            Ok(parsed @ Value::Object(_)) => Ok(parsed),
            _ => Ok(Value::Object(object.clone())),
        }
    }
}

/// Rejects `undefined` fields in the wrapped schema's output.
struct RequiredSchema {
    inner: Schema,
}

impl Validate for RequiredSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        settle_required(input, self.inner.parse(input))
    }
}

fn collect_fields<K, I>(fields: I) -> IndexMap<String, Schema>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Schema)>,
{
    fields.into_iter().map(|(k, s)| (k.into(), s)).collect()
}

fn object(fields: IndexMap<String, Schema>, unknown: UnknownKeys<Schema>) -> Schema {
    let metadata = object_metadata(&fields, &unknown);
    Schema::build(ObjectSchema { fields, unknown }, metadata)
}

impl Schema {
    /// Validates declared keys in order; undeclared keys are dropped.
    ///
    /// A declared key missing from the input is validated as `undefined`.
    pub fn object<K, I>(fields: I) -> Schema
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        object(collect_fields(fields), UnknownKeys::Strip)
    }

    /// Like [`Schema::object`] but copies undeclared keys into the output.
    pub fn loose_object<K, I>(fields: I) -> Schema
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        object(collect_fields(fields), UnknownKeys::Passthrough)
    }

    /// Like [`Schema::object`] but validates undeclared keys against `rest`
    /// and keeps them.
    pub fn object_with_rest<K, I>(fields: I, rest: Schema) -> Schema
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        object(collect_fields(fields), UnknownKeys::Rest(rest))
    }

    /// Validates every key against `key` and every value against `value`.
    ///
    /// Key failures read `Invalid key "K": message`; value failures read
    /// `K: message`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    /// use serde_json::json;
    ///
    /// let scores = Schema::record(Schema::string(), Schema::number());
    /// let err = scores.parse(&Value::from(json!({"a": "bad"}))).unwrap_err();
    /// assert_eq!(err.message(), "a: Expected number");
    /// ```
    pub fn record(key: Schema, value: Schema) -> Schema {
        let metadata = Metadata::new("record").with_inner(Inner::Entry {
            key: Box::new(SchemaRef::from(&key)),
            value: Box::new(SchemaRef::from(&value)),
        });
        Schema::build(RecordSchema { key, value }, metadata)
    }

    /// Accepts any plain object, tolerating missing fields.
    ///
    /// When the wrapped object schema accepts the input its output is
    /// returned; otherwise a copy of the input is.
    pub fn partial(object: Schema) -> Schema {
        let metadata = Metadata::wrap("partial", &object, None);
        Schema::build(PartialSchema { inner: object }, metadata)
    }

    /// Rejects the first field of `object`'s output whose value is
    /// `undefined` with `"key: Required"`. When `object` fails, an
    /// `undefined` input field is reported the same way in its place.
    pub fn required(object: Schema) -> Schema {
        let metadata = Metadata::wrap("required", &object, None);
        Schema::build(RequiredSchema { inner: object }, metadata)
    }
}
