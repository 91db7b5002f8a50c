//! Validators and the combinators that compose them.
//!
//! Every validator is reached through a [`Schema`] handle. Constructors
//! build leaves (`Schema::string()`), combinators (`Schema::object(..)`,
//! `Schema::array(..)`) and modifiers (`schema.optional()`) out of other
//! handles, so a schema tree is built bottom-up and every node satisfies
//! the same three-mode contract:
//!
//! - throwing: [`Schema::parse`] returns `Result<Value, ValidationError>`
//! - safe: [`Schema::safe`] returns a [`SafeResult`] holding the flat message
//! - standard: [`Schema::standard`] returns `{value}` or `{issues}`
//!
//! # Example
//!
//! ```rust
//! use assay::{Schema, Value};
//! use serde_json::json;
//!
//! let user = Schema::object([
//!     ("name", Schema::string()),
//!     ("age", Schema::number()),
//! ]);
//!
//! let out = user.parse(&Value::from(json!({"name": "John", "age": 30}))).unwrap();
//! assert_eq!(out, Value::from(json!({"name": "John", "age": 30})));
//!
//! let err = user.parse(&Value::from(json!({"name": 123}))).unwrap_err();
//! assert_eq!(err.message(), "name: Expected string");
//! ```

pub(crate) mod array;
pub(crate) mod collections;
pub(crate) mod combinators;
pub(crate) mod modifiers;
pub(crate) mod object;
pub(crate) mod pipe;
mod primitive;
mod traits;

use std::fmt::{self, Display};
use std::sync::Arc;

use stillwater::Validation;

pub use modifiers::Fallback;
pub use pipe::{IssueCollector, MapFn, PipeStep, INVALID_INPUT};
pub use traits::Validate;

use crate::error::{guard, Issue, ValidationError};
use crate::metadata::{Metadata, MetadataCell, MetadataUpdate};
use crate::outcome::{SafeResult, StandardResult, STANDARD_VERSION, VENDOR};
use crate::value::Value;

/// A shareable validator handle.
///
/// Cloning a `Schema` is cheap and yields a handle to the same validator
/// and the same metadata slot.
#[derive(Clone)]
pub struct Schema {
    validator: Arc<dyn Validate>,
    metadata: MetadataCell,
}

impl Schema {
    /// Wraps a [`Validate`] implementation. No metadata is attached.
    pub fn new<V>(validator: V) -> Self
    where
        V: Validate + 'static,
    {
        Self {
            validator: Arc::new(validator),
            metadata: MetadataCell::default(),
        }
    }

    /// Wraps a validator and attaches its construction-time metadata.
    pub(crate) fn build<V>(validator: V, metadata: Metadata) -> Self
    where
        V: Validate + 'static,
    {
        Self::with_metadata(validator, Some(metadata))
    }

    pub(crate) fn with_metadata<V>(validator: V, metadata: Option<Metadata>) -> Self
    where
        V: Validate + 'static,
    {
        Self {
            validator: Arc::new(validator),
            metadata: MetadataCell::new(metadata),
        }
    }

    /// Builds a validator from a throwing operation.
    ///
    /// The safe and standard modes are synthesized from `parse`. An `Err`
    /// surfaces its `Display` text and a panic is normalized (string
    /// payloads keep their text, anything else reads `"Unknown error"`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let positive = Schema::from_fn(|input: &Value| match input.as_f64() {
    ///     Some(n) if n > 0.0 => Ok(input.clone()),
    ///     _ => Err("Expected positive number"),
    /// });
    ///
    /// assert!(positive.parse(&Value::from(2)).is_ok());
    /// assert_eq!(
    ///     positive.parse(&Value::from(-2)).unwrap_err().message(),
    ///     "Expected positive number"
    /// );
    /// ```
    pub fn from_fn<F, E>(parse: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Display,
    {
        Self::build(FnValidator { parse }, Metadata::new("custom"))
    }

    /// Builds a validator from a throwing operation and a matching safe one.
    ///
    /// The standard mode is derived from `safe`, so its issues carry no path.
    /// The caller is responsible for the two operations agreeing.
    pub fn with_safe<F, S, E>(parse: F, safe: S) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        S: Fn(&Value) -> SafeResult + Send + Sync + 'static,
        E: Display,
    {
        Self::build(SafePairValidator { parse, safe }, Metadata::new("custom"))
    }

    /// Throwing mode.
    pub fn parse(&self, input: &Value) -> Result<Value, ValidationError> {
        self.validator.validate(input)
    }

    /// Safe mode. Never panics on behalf of user callbacks.
    pub fn safe(&self, input: &Value) -> SafeResult {
        self.validator.validate_safe(input)
    }

    /// Standard introspection entry point.
    pub fn standard(&self) -> Standard<'_> {
        Standard { schema: self }
    }

    /// The metadata slot, shared with handles converted from this one.
    pub(crate) fn metadata_cell(&self) -> &MetadataCell {
        &self.metadata
    }

    /// Returns a copy of the attached metadata, if any.
    pub fn metadata(&self) -> Option<Metadata> {
        self.metadata.get()
    }

    /// Returns the metadata type tag, if any.
    pub fn kind(&self) -> Option<String> {
        self.metadata.kind()
    }

    /// Attaches metadata, replacing any previous value.
    pub fn set_metadata(&self, metadata: Metadata) {
        self.metadata.set(metadata);
    }

    /// Shallow-merges `update` into the metadata.
    ///
    /// When no metadata exists yet it is created only if the update names a
    /// kind; returns false if nothing was written.
    pub fn update_metadata(&self, update: MetadataUpdate) -> bool {
        self.metadata.update(update)
    }

    /// Sets the description and returns self for chaining.
    pub fn describe(self, description: impl Into<String>) -> Self {
        let update = MetadataUpdate {
            kind: Some(self.kind().unwrap_or_else(|| "custom".to_string())),
            ..MetadataUpdate::description(description)
        };
        self.metadata.update(update);
        self
    }

    /// Replaces any failure of this validator with `message`.
    ///
    /// The replacement is a single root-level issue, so nested paths of the
    /// original failure are not reported.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let schema = Schema::string().error("name must be text");
    /// let err = schema.parse(&Value::from(1)).unwrap_err();
    /// assert_eq!(err.message(), "name must be text");
    /// ```
    pub fn error(self, message: impl Into<String>) -> Self {
        let metadata = Metadata::wrap("error", &self, None);
        Self::build(
            MessageOverride {
                inner: self,
                message: message.into(),
            },
            metadata,
        )
    }
}

impl Validate for Schema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.validator.validate(input)
    }

    fn validate_safe(&self, input: &Value) -> SafeResult {
        self.validator.validate_safe(input)
    }

    fn validate_standard(&self, input: &Value) -> StandardResult {
        self.validator.validate_standard(input)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// The standard introspection protocol view of a [`Schema`].
///
/// # Example
///
/// ```rust
/// use assay::{Schema, StandardResult, Value};
///
/// let schema = Schema::string();
/// let standard = schema.standard();
/// assert_eq!(standard.version(), 1);
/// assert_eq!(standard.vendor(), "assay");
/// assert!(matches!(
///     standard.validate(&Value::from("x")),
///     StandardResult::Success { .. }
/// ));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Standard<'a> {
    schema: &'a Schema,
}

impl Standard<'_> {
    /// Always 1.
    pub fn version(&self) -> u32 {
        STANDARD_VERSION
    }

    /// The library name reported to standard-protocol consumers.
    pub fn vendor(&self) -> &'static str {
        VENDOR
    }

    /// Standard mode: a success value or the full list of issues.
    pub fn validate(&self, input: &Value) -> StandardResult {
        self.schema.validator.validate_standard(input)
    }
}

/// Validator built by [`Schema::from_fn`].
struct FnValidator<F> {
    parse: F,
}

impl<F, E> Validate for FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, E> + Send + Sync,
    E: Display,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        guard(|| (self.parse)(input).map_err(ValidationError::foreign))
    }
}

/// Validator built by [`Schema::with_safe`].
struct SafePairValidator<F, S> {
    parse: F,
    safe: S,
}

impl<F, S, E> Validate for SafePairValidator<F, S>
where
    F: Fn(&Value) -> Result<Value, E> + Send + Sync,
    S: Fn(&Value) -> SafeResult + Send + Sync,
    E: Display,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        guard(|| (self.parse)(input).map_err(ValidationError::foreign))
    }

    fn validate_safe(&self, input: &Value) -> SafeResult {
        match guard(|| Ok((self.safe)(input))) {
            Ok(result) => result,
            Err(error) => Validation::Failure(error.message().to_string()),
        }
    }

    fn validate_standard(&self, input: &Value) -> StandardResult {
        StandardResult::from(self.validate_safe(input))
    }
}

/// Validator built by [`Schema::error`].
struct MessageOverride {
    inner: Schema,
    message: String,
}

impl Validate for MessageOverride {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.inner
            .parse(input)
            .map_err(|error| override_message(&error, &self.message))
    }
}

/// Collapses `error` into one root issue carrying `message`, keeping the
/// original code.
pub(crate) fn override_message(error: &ValidationError, message: &str) -> ValidationError {
    let code = error.issues().first().code.clone();
    ValidationError::from_issue(Issue::new(message).with_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UNKNOWN_ERROR;
    use serde_json::json;

    #[test]
    fn test_from_fn_derives_all_modes() {
        let schema = Schema::from_fn(|input: &Value| {
            if input.is_null() {
                Err("null not allowed")
            } else {
                Ok(input.clone())
            }
        });

        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::from(1));
        assert_eq!(
            schema.safe(&Value::Null),
            Validation::Failure("null not allowed".to_string())
        );
        let result = schema.standard().validate(&Value::Null);
        assert_eq!(result.issues()[0].message, "null not allowed");
    }

    #[test]
    fn test_from_fn_normalizes_panics() {
        let schema = Schema::from_fn(|_: &Value| -> Result<Value, String> {
            std::panic::panic_any(vec![1, 2, 3])
        });
        assert_eq!(
            schema.safe(&Value::Null),
            Validation::Failure(UNKNOWN_ERROR.to_string())
        );

        let schema = Schema::from_fn(|_: &Value| -> Result<Value, String> { panic!("exploded") });
        assert_eq!(schema.parse(&Value::Null).unwrap_err().message(), "exploded");
    }

    #[test]
    fn test_with_safe_uses_supplied_safe_operation() {
        let schema = Schema::with_safe(
            |input: &Value| -> Result<Value, String> { Ok(input.clone()) },
            |_: &Value| Validation::Failure("safe says no".to_string()),
        );

        assert!(schema.parse(&Value::Null).is_ok());
        assert_eq!(
            schema.safe(&Value::Null),
            Validation::Failure("safe says no".to_string())
        );
        let result = schema.standard().validate(&Value::Null);
        assert_eq!(result.issues()[0].message, "safe says no");
        assert!(result.issues()[0].location().is_none());
    }

    #[test]
    fn test_with_safe_guards_safe_operation() {
        let schema = Schema::with_safe(
            |input: &Value| -> Result<Value, String> { Ok(input.clone()) },
            |_: &Value| -> SafeResult { panic!("safe exploded") },
        );
        assert_eq!(
            schema.safe(&Value::Null),
            Validation::Failure("safe exploded".to_string())
        );
    }

    #[test]
    fn test_error_override_replaces_message() {
        let schema = Schema::object([("name", Schema::string())]).error("bad user");
        let err = schema.parse(&Value::from(json!({"name": 1}))).unwrap_err();
        assert_eq!(err.message(), "bad user");
        assert!(err.issues().first().path.is_root());
        assert_eq!(schema.kind().as_deref(), Some("error"));
    }

    #[test]
    fn test_clones_share_metadata() {
        let schema = Schema::string();
        let alias = schema.clone().describe("a name");
        assert_eq!(
            schema.metadata().unwrap().description.as_deref(),
            Some("a name")
        );
        assert_eq!(alias.kind().as_deref(), Some("string"));
    }

    #[test]
    fn test_metadata_never_changes_outcomes() {
        let schema = Schema::number();
        let before = schema.safe(&Value::from("x"));

        schema.set_metadata(Metadata::new("anything").with_constraint("minimum", 100));
        schema.update_metadata(MetadataUpdate::description("changed"));

        assert_eq!(schema.safe(&Value::from("x")), before);
        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::from(1));
    }

    #[test]
    fn test_validation_does_not_touch_metadata() {
        let schema = Schema::array(Schema::string()).describe("tags");
        let _ = schema.parse(&Value::from(json!(["a", 1])));
        let _ = schema.safe(&Value::from(json!(["a"])));
        let meta = schema.metadata().unwrap();
        assert_eq!(meta.kind, "array");
        assert_eq!(meta.description.as_deref(), Some("tags"));
    }
}
