//! Left-to-right sequencing and the actions used inside it.
//!
//! [`Schema::pipe`] feeds each step's output into the next step and stops at
//! the first failure, returning that step's error unmodified. Steps are
//! either validators or bare mapping functions ([`PipeStep::map`]) that
//! always succeed.
//!
//! The actions in this module are ordinary validators meant to refine a
//! value after a type check:
//!
//! - predicates: [`Schema::check`], [`Schema::check_items`]
//! - bounds: [`Schema::min_length`], [`Schema::max_length`],
//!   [`Schema::min_value`], [`Schema::max_value`], [`Schema::regex`]
//! - transforms: [`Schema::transform`]
//! - issue collectors: [`Schema::raw_check`], [`Schema::raw_transform`]
//!
//! # Example
//!
//! ```rust
//! use assay::{PipeStep, Schema, Value};
//!
//! let username = Schema::pipe([
//!     PipeStep::from(Schema::string()),
//!     PipeStep::map(|v| Value::from(v.as_str().unwrap_or_default().trim())),
//!     PipeStep::from(Schema::min_length(3)),
//! ]);
//!
//! assert_eq!(username.parse(&Value::from("  ada  ")).unwrap(), Value::from("ada"));
//! assert!(username.parse(&Value::from(" al ")).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use stillwater::Validation;

use crate::error::{guard, Issue, Issues, ValidationError};
use crate::metadata::Metadata;
use crate::outcome::SafeResult;
use crate::path::JsonPath;
use crate::value::Value;

use super::array::expect_array;
use super::traits::Validate;
use super::Schema;

/// Default message of a failed predicate.
pub const INVALID_INPUT: &str = "Invalid input";

/// Mapping function used as a pipe step.
pub type MapFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One stage of a [`Schema::pipe`].
#[derive(Clone)]
pub enum PipeStep {
    /// A validator; its failure ends the pipe.
    Validator(Schema),
    /// A mapping function that always succeeds.
    Map(MapFn),
}

impl PipeStep {
    /// Wraps a mapping function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        PipeStep::Map(Arc::new(f))
    }

    fn metadata(&self) -> Option<Metadata> {
        match self {
            PipeStep::Validator(schema) => schema.metadata(),
            PipeStep::Map(_) => None,
        }
    }

    fn run(&self, value: Value) -> Result<Value, ValidationError> {
        match self {
            PipeStep::Validator(schema) => schema.parse(&value),
            PipeStep::Map(f) => apply_map(f, value),
        }
    }

    fn run_safe(&self, value: Value) -> SafeResult {
        match self {
            PipeStep::Validator(schema) => schema.safe(&value),
            PipeStep::Map(f) => match apply_map(f, value) {
                Ok(out) => Validation::Success(out),
                Err(error) => Validation::Failure(error.message().to_string()),
            },
        }
    }
}

pub(crate) fn apply_map(f: &MapFn, value: Value) -> Result<Value, ValidationError> {
    guard(|| Ok(f(value)))
}

impl From<Schema> for PipeStep {
    fn from(schema: Schema) -> Self {
        PipeStep::Validator(schema)
    }
}

impl fmt::Debug for PipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeStep::Validator(schema) => f.debug_tuple("Validator").field(schema).finish(),
            PipeStep::Map(_) => f.write_str("Map(..)"),
        }
    }
}

struct PipeSchema {
    steps: Vec<PipeStep>,
}

impl Validate for PipeSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.steps
            .iter()
            .try_fold(input.clone(), |value, step| step.run(value))
    }

    fn validate_safe(&self, input: &Value) -> SafeResult {
        let mut value = input.clone();
        for step in &self.steps {
            match step.run_safe(value) {
                Validation::Success(out) => value = out,
                failure => return failure,
            }
        }
        Validation::Success(value)
    }
}

/// Collects issues reported by a [`Schema::raw_check`] or
/// [`Schema::raw_transform`] callback.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reports an issue at the value itself.
    pub fn add_issue(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::new(message).with_code("custom"));
    }

    /// Reports an issue at `path` below the value.
    pub fn add_issue_at(&mut self, path: JsonPath, message: impl Into<String>) {
        self.issues
            .push(Issue::new(message).with_code("custom").with_path(path));
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(output)` when nothing was reported, otherwise every issue with
    /// the first one's message as the flat message.
    pub(crate) fn finish(self, output: Value) -> Result<Value, ValidationError> {
        match Issues::from_vec(self.issues) {
            Some(issues) => Err(ValidationError::from_issues(issues)),
            None => Ok(output),
        }
    }
}

/// A length, range or pattern bound.
#[derive(Debug, Clone)]
pub(crate) enum Bound {
    MinLength(usize),
    MaxLength(usize),
    MinValue(f64),
    MaxValue(f64),
    Pattern(Regex),
}

impl Bound {
    fn kind(&self) -> &'static str {
        match self {
            Bound::MinLength(_) => "min_length",
            Bound::MaxLength(_) => "max_length",
            Bound::MinValue(_) => "min_value",
            Bound::MaxValue(_) => "max_value",
            Bound::Pattern(_) => "regex",
        }
    }

    fn metadata(&self) -> Metadata {
        let meta = Metadata::new(self.kind());
        match self {
            Bound::MinLength(n) => meta.with_constraint("minLength", *n),
            Bound::MaxLength(n) => meta.with_constraint("maxLength", *n),
            Bound::MinValue(n) => meta.with_constraint("minimum", Value::from(*n).to_json()),
            Bound::MaxValue(n) => meta.with_constraint("maximum", Value::from(*n).to_json()),
            Bound::Pattern(regex) => meta.with_constraint("pattern", regex.as_str()),
        }
    }

    /// Returns the default failure message, or `None` when `value` is within
    /// the bound.
    fn violation(&self, value: &Value) -> Result<Option<String>, ValidationError> {
        match self {
            Bound::MinLength(min) => {
                let len = length_of(value)?;
                Ok((len < *min)
                    .then(|| format!("Length must be at least {}, got {}", min, len)))
            }
            Bound::MaxLength(max) => {
                let len = length_of(value)?;
                Ok((len > *max).then(|| format!("Length must be at most {}, got {}", max, len)))
            }
            Bound::MinValue(min) => {
                let n = number_of(value)?;
                Ok((n < *min).then(|| {
                    format!(
                        "Value must be at least {}, got {}",
                        Value::from(*min),
                        Value::from(n)
                    )
                }))
            }
            Bound::MaxValue(max) => {
                let n = number_of(value)?;
                Ok((n > *max).then(|| {
                    format!(
                        "Value must be at most {}, got {}",
                        Value::from(*max),
                        Value::from(n)
                    )
                }))
            }
            Bound::Pattern(regex) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| ValidationError::invalid_type("Expected string"))?;
                Ok((!regex.is_match(s))
                    .then(|| format!("Must match pattern '{}'", regex.as_str())))
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Bound::MinLength(_) => "too_small",
            Bound::MaxLength(_) => "too_big",
            Bound::MinValue(_) => "too_small",
            Bound::MaxValue(_) => "too_big",
            Bound::Pattern(_) => "invalid_format",
        }
    }
}

/// Strings count characters; arrays, sets and maps count entries.
fn length_of(value: &Value) -> Result<usize, ValidationError> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(items) | Value::Set(items) => Ok(items.len()),
        Value::Map(entries) => Ok(entries.len()),
        _ => Err(ValidationError::invalid_type("Expected string or array")),
    }
}

fn number_of(value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .ok_or_else(|| ValidationError::invalid_type("Expected number"))
}

struct BoundSchema {
    bound: Bound,
    message: Option<String>,
}

impl Validate for BoundSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        match self.bound.violation(input)? {
            None => Ok(input.clone()),
            Some(default) => Err(ValidationError::new(
                self.message.clone().unwrap_or(default),
            )
            .with_code(self.bound.code())),
        }
    }
}

fn bound(bound: Bound, message: Option<String>) -> Schema {
    let metadata = bound.metadata();
    Schema::build(BoundSchema { bound, message }, metadata)
}

struct CheckSchema<P> {
    predicate: P,
    message: String,
}

impl<P> Validate for CheckSchema<P>
where
    P: Fn(&Value) -> bool + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        if guard(|| Ok((self.predicate)(input)))? {
            Ok(input.clone())
        } else {
            Err(ValidationError::new(self.message.clone()).with_code("custom"))
        }
    }
}

struct CheckItemsSchema<P> {
    predicate: P,
    message: String,
}

impl<P> Validate for CheckItemsSchema<P>
where
    P: Fn(&Value) -> bool + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let items = expect_array(input)?;
        for (index, item) in items.iter().enumerate() {
            if !guard(|| Ok((self.predicate)(item)))? {
                return Err(ValidationError::new(self.message.clone())
                    .with_code("custom")
                    .at_index(index));
            }
        }
        Ok(input.clone())
    }
}

struct TransformSchema<F> {
    transform: F,
}

impl<F> Validate for TransformSchema<F>
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        guard(|| Ok((self.transform)(input)))
    }
}

struct RawCheckSchema<F> {
    check: F,
}

impl<F> Validate for RawCheckSchema<F>
where
    F: Fn(&Value, &mut IssueCollector) + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let collector = guard(|| {
            let mut collector = IssueCollector::new();
            (self.check)(input, &mut collector);
            Ok(collector)
        })?;
        collector.finish(input.clone())
    }
}

struct RawTransformSchema<F> {
    transform: F,
}

impl<F> Validate for RawTransformSchema<F>
where
    F: Fn(&Value, &mut IssueCollector) -> Value + Send + Sync,
{
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        let (collector, output) = guard(|| {
            let mut collector = IssueCollector::new();
            let output = (self.transform)(input, &mut collector);
            Ok((collector, output))
        })?;
        collector.finish(output)
    }
}

impl Schema {
    /// Runs `steps` left to right, each receiving the previous output.
    ///
    /// Metadata is merged across the steps: the first step's kind, all
    /// constraints, and the last defined documentation and inner.
    pub fn pipe<I>(steps: I) -> Schema
    where
        I: IntoIterator,
        I::Item: Into<PipeStep>,
    {
        let steps: Vec<PipeStep> = steps.into_iter().map(Into::into).collect();
        let metadata = Metadata::merge(steps.iter().map(PipeStep::metadata));
        Schema::with_metadata(PipeSchema { steps }, metadata)
    }

    /// Replaces the value with `transform(value)`. Never fails unless the
    /// transform panics.
    pub fn transform<F>(transform: F) -> Schema
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Schema::build(TransformSchema { transform }, Metadata::new("transform"))
    }

    /// Fails with `"Invalid input"` when `predicate` returns false.
    pub fn check<P>(predicate: P) -> Schema
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::check_with(predicate, INVALID_INPUT)
    }

    /// Fails with `message` when `predicate` returns false.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let even = Schema::check_with(
    ///     |v: &Value| v.as_f64().map_or(false, |n| n % 2.0 == 0.0),
    ///     "Expected even number",
    /// );
    /// assert_eq!(
    ///     even.parse(&Value::from(3)).unwrap_err().message(),
    ///     "Expected even number"
    /// );
    /// ```
    pub fn check_with<P>(predicate: P, message: impl Into<String>) -> Schema
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let check = CheckSchema {
            predicate,
            message: message.into(),
        };
        Schema::build(check, Metadata::new("check"))
    }

    /// Checks every item of an array; the first failing item reports
    /// `"[i]: Invalid input"`.
    pub fn check_items<P>(predicate: P) -> Schema
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::check_items_with(predicate, INVALID_INPUT)
    }

    /// Like [`Schema::check_items`] with a custom message.
    pub fn check_items_with<P>(predicate: P, message: impl Into<String>) -> Schema
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let check = CheckItemsSchema {
            predicate,
            message: message.into(),
        };
        Schema::build(check, Metadata::new("check_items"))
    }

    /// Requires a string of at least `min` characters, or an array, set or
    /// map of at least `min` entries.
    pub fn min_length(min: usize) -> Schema {
        bound(Bound::MinLength(min), None)
    }

    pub fn min_length_with(min: usize, message: impl Into<String>) -> Schema {
        bound(Bound::MinLength(min), Some(message.into()))
    }

    /// Requires at most `max` characters or entries.
    pub fn max_length(max: usize) -> Schema {
        bound(Bound::MaxLength(max), None)
    }

    pub fn max_length_with(max: usize, message: impl Into<String>) -> Schema {
        bound(Bound::MaxLength(max), Some(message.into()))
    }

    /// Requires a number no smaller than `min`.
    pub fn min_value(min: f64) -> Schema {
        bound(Bound::MinValue(min), None)
    }

    pub fn min_value_with(min: f64, message: impl Into<String>) -> Schema {
        bound(Bound::MinValue(min), Some(message.into()))
    }

    /// Requires a number no larger than `max`.
    pub fn max_value(max: f64) -> Schema {
        bound(Bound::MaxValue(max), None)
    }

    pub fn max_value_with(max: f64, message: impl Into<String>) -> Schema {
        bound(Bound::MaxValue(max), Some(message.into()))
    }

    /// Requires a string matching `pattern`.
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn regex(pattern: &str) -> Result<Schema, regex::Error> {
        Ok(bound(Bound::Pattern(Regex::new(pattern)?), None))
    }

    pub fn regex_with(pattern: &str, message: impl Into<String>) -> Result<Schema, regex::Error> {
        Ok(bound(Bound::Pattern(Regex::new(pattern)?), Some(message.into())))
    }

    /// Runs `check` with an [`IssueCollector`]. The value passes unchanged
    /// when no issue is reported.
    ///
    /// All reported issues appear in the standard mode; the flat message is
    /// the first one's.
    pub fn raw_check<F>(check: F) -> Schema
    where
        F: Fn(&Value, &mut IssueCollector) + Send + Sync + 'static,
    {
        Schema::build(RawCheckSchema { check }, Metadata::new("raw_check"))
    }

    /// Like [`Schema::raw_check`] but the callback also produces the output.
    pub fn raw_transform<F>(transform: F) -> Schema
    where
        F: Fn(&Value, &mut IssueCollector) -> Value + Send + Sync + 'static,
    {
        Schema::build(RawTransformSchema { transform }, Metadata::new("raw_transform"))
    }
}
