//! Combinators choosing between or chaining several validators.
//!
//! - [`Schema::union`]: the first alternative that accepts wins
//! - [`Schema::variant`]: a union over objects, reported by discriminant
//! - [`Schema::intersect`]: every part in sequence, each narrowing the last
//! - [`Schema::lazy`]: a validator resolved at call time, for recursion
//!
//! # Example
//!
//! ```rust
//! use assay::{Schema, Value};
//!
//! let id = Schema::union([Schema::string(), Schema::number()]);
//!
//! assert_eq!(id.parse(&Value::from(42)).unwrap(), Value::from(42));
//! assert_eq!(
//!     id.parse(&Value::from(true)).unwrap_err().message(),
//!     "No matching schema in union"
//! );
//! ```

use stillwater::Validation;

use crate::error::{guard, ValidationError};
use crate::metadata::{Inner, Metadata, SchemaRef};
use crate::value::Value;

use super::object::expect_object;
use super::traits::Validate;
use super::Schema;

pub(crate) const NO_UNION_MATCH: &str = "No matching schema in union";

pub(crate) fn no_union_match() -> ValidationError {
    tracing::trace!("union exhausted all alternatives");
    ValidationError::new(NO_UNION_MATCH).with_code("invalid_union")
}

pub(crate) fn no_variant_match(key: &str, input: &Value) -> ValidationError {
    let found = input.get(key).render();
    tracing::trace!(key, found = %found, "variant exhausted all alternatives");
    ValidationError::new(format!("No matching variant for {}={}", key, found))
        .with_code("invalid_union")
}

pub(crate) fn many_metadata<R: Into<SchemaRef> + Clone>(kind: &str, parts: &[R]) -> Metadata {
    Metadata::new(kind).with_inner(Inner::Many(parts.iter().cloned().map(Into::into).collect()))
}

struct UnionSchema {
    options: Vec<Schema>,
}

impl Validate for UnionSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        for option in &self.options {
            if let Validation::Success(value) = option.safe(input) {
                return Ok(value);
            }
        }
        Err(no_union_match())
    }
}

struct VariantSchema {
    key: String,
    options: Vec<Schema>,
}

impl Validate for VariantSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        expect_object(input)?;
        for option in &self.options {
            if let Validation::Success(value) = option.safe(input) {
                return Ok(value);
            }
        }
        Err(no_variant_match(&self.key, input))
    }
}

struct IntersectSchema {
    parts: Vec<Schema>,
}

impl Validate for IntersectSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.parts
            .iter()
            .try_fold(input.clone(), |value, part| part.parse(&value))
    }
}

struct LazySchema<F> {
    getter: F,
}

impl<F> Validate for LazySchema<F>
where
    F: Fn() -> Schema + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let resolved = guard(|| Ok((self.getter)()))?;
        tracing::trace!(kind = ?resolved.kind(), "resolved lazy schema");
        resolved.parse(input)
    }
}

impl Schema {
    /// Returns the output of the first alternative that accepts the input.
    ///
    /// Alternatives are tried in order, so when several could accept the
    /// same input the earliest wins.
    pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
        let options: Vec<Schema> = options.into_iter().collect();
        let metadata = many_metadata("union", &options);
        Schema::build(UnionSchema { options }, metadata)
    }

    /// A union over objects tagged by `key`.
    ///
    /// Non-objects fail with `"Expected object"`. When no alternative
    /// accepts, the message names the discriminant found:
    /// `No matching variant for type="square"`.
    pub fn variant(key: impl Into<String>, options: impl IntoIterator<Item = Schema>) -> Schema {
        let key = key.into();
        let options: Vec<Schema> = options.into_iter().collect();
        let metadata =
            many_metadata("variant", &options).with_constraint("discriminator", key.clone());
        Schema::build(VariantSchema { key, options }, metadata)
    }

    /// Threads the input through every part in order; each part receives
    /// the previous part's output. The first failure is returned as is.
    pub fn intersect(parts: impl IntoIterator<Item = Schema>) -> Schema {
        let parts: Vec<Schema> = parts.into_iter().collect();
        let metadata = many_metadata("intersect", &parts);
        Schema::build(IntersectSchema { parts }, metadata)
    }

    /// Resolves the validator by calling `getter` on every validation.
    ///
    /// This is how recursive schemas refer to themselves.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    /// use serde_json::json;
    ///
    /// fn tree() -> Schema {
    ///     Schema::object([
    ///         ("value", Schema::number()),
    ///         ("children", Schema::array(Schema::lazy(tree))),
    ///     ])
    /// }
    ///
    /// let input = json!({"value": 1, "children": [{"value": 2, "children": []}]});
    /// assert!(tree().parse(&Value::from(input)).is_ok());
    /// ```
    pub fn lazy<F>(getter: F) -> Schema
    where
        F: Fn() -> Schema + Send + Sync + 'static,
    {
        Schema::build(LazySchema { getter }, Metadata::new("lazy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_union_first_match_wins() {
        let tagged = |tag: &'static str| {
            Schema::from_fn(move |input: &Value| -> Result<Value, String> {
                input
                    .as_f64()
                    .map(|_| Value::from(tag))
                    .ok_or_else(|| "Expected number".to_string())
            })
        };
        let schema = Schema::union([tagged("first"), tagged("second")]);
        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::from("first"));
    }

    #[test]
    fn test_union_no_match() {
        let schema = Schema::union([Schema::string(), Schema::number()]);
        let err = schema.parse(&Value::from(true)).unwrap_err();
        assert_eq!(err.message(), NO_UNION_MATCH);
        assert_eq!(
            schema.safe(&Value::from(true)),
            Validation::Failure(NO_UNION_MATCH.to_string())
        );
    }

    #[test]
    fn test_variant_reports_discriminant() {
        let circle = Schema::object([
            ("type", Schema::literal("circle")),
            ("radius", Schema::number()),
        ]);
        let rect = Schema::object([
            ("type", Schema::literal("rect")),
            ("width", Schema::number()),
        ]);
        let shape = Schema::variant("type", [circle, rect]);

        assert!(shape.parse(&v(json!({"type": "rect", "width": 2}))).is_ok());
        assert_eq!(
            shape
                .parse(&v(json!({"type": "square"})))
                .unwrap_err()
                .message(),
            "No matching variant for type=\"square\""
        );
        assert_eq!(
            shape.parse(&v(json!({}))).unwrap_err().message(),
            "No matching variant for type=undefined"
        );
        assert_eq!(
            shape.parse(&v(json!([1]))).unwrap_err().message(),
            "Expected object"
        );
    }

    #[test]
    fn test_intersect_threads_output() {
        let add_one = Schema::from_fn(|input: &Value| match input.as_f64() {
            Some(n) => Ok(Value::from(n + 1.0)),
            None => Err("Expected number"),
        });
        let schema = Schema::intersect([add_one.clone(), add_one]);
        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::from(3));
    }

    #[test]
    fn test_intersect_error_is_not_prefixed() {
        let schema = Schema::intersect([
            Schema::loose_object([("a", Schema::string())]),
            Schema::loose_object([("b", Schema::number())]),
        ]);
        let err = schema.parse(&v(json!({"a": "x", "b": "y"}))).unwrap_err();
        assert_eq!(err.message(), "b: Expected number");
        assert_eq!(
            schema.parse(&v(json!({"a": "x", "b": 1}))).unwrap(),
            v(json!({"a": "x", "b": 1}))
        );
    }

    #[test]
    fn test_lazy_resolves_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Schema::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Schema::string()
        });

        assert!(schema.parse(&Value::from("a")).is_ok());
        assert!(schema.parse(&Value::from(1)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lazy_getter_panic_is_normalized() {
        let schema = Schema::lazy(|| panic!("no schema yet"));
        assert_eq!(
            schema.safe(&Value::Null),
            Validation::Failure("no schema yet".to_string())
        );
    }
}
