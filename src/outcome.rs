//! Result shapes for the non-throwing modes and the application boundary.
//!
//! - [`SafeResult`]: the safe mode's `{ok, value} | {ok: false, error}`.
//! - [`StandardResult`]: the introspection protocol's `{value} | {issues}`.
//! - [`SafeParse`]: the application-facing `{success, data} | {success:
//!   false, error}` produced by [`safe_parse`].

use stillwater::Validation;

use crate::error::{Issue, ValidationError};
use crate::schema::Schema;
use crate::value::Value;

/// The fixed `version` of the standard introspection protocol.
pub const STANDARD_VERSION: u32 = 1;

/// The `vendor` identifier reported by the standard introspection protocol.
pub const VENDOR: &str = "assay";

/// Outcome of the safe mode: the validated value or a single message.
pub type SafeResult = Validation<Value, String>;

/// Converts a throwing-mode result into the safe-mode shape.
pub(crate) fn to_safe(result: Result<Value, ValidationError>) -> SafeResult {
    match result {
        Ok(value) => Validation::Success(value),
        Err(error) => Validation::Failure(error.message().to_string()),
    }
}

/// Outcome of the standard introspection protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum StandardResult {
    /// `{ value }`
    Success { value: Value },
    /// `{ issues: [{ message, path? }] }`
    Failure { issues: Vec<Issue> },
}

impl StandardResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StandardResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the issues of a failure, or an empty slice on success.
    pub fn issues(&self) -> &[Issue] {
        match self {
            StandardResult::Success { .. } => &[],
            StandardResult::Failure { issues } => issues,
        }
    }

    /// Builds the failure shape from a safe-mode message, with no path.
    pub(crate) fn from_message(message: impl Into<String>) -> Self {
        StandardResult::Failure {
            issues: vec![Issue::new(message)],
        }
    }
}

impl From<Result<Value, ValidationError>> for StandardResult {
    fn from(result: Result<Value, ValidationError>) -> Self {
        match result {
            Ok(value) => StandardResult::Success { value },
            Err(error) => StandardResult::Failure {
                issues: error.into_issues().into_vec(),
            },
        }
    }
}

impl From<SafeResult> for StandardResult {
    fn from(result: SafeResult) -> Self {
        match result {
            Validation::Success(value) => StandardResult::Success { value },
            Validation::Failure(message) => StandardResult::from_message(message),
        }
    }
}

/// Application-facing result of [`safe_parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse {
    Success { data: Value },
    Failure { error: String },
}

impl SafeParse {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success { .. })
    }

    /// Returns the parsed data, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            SafeParse::Success { data } => Some(data),
            SafeParse::Failure { .. } => None,
        }
    }

    /// Returns the error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            SafeParse::Success { .. } => None,
            SafeParse::Failure { error } => Some(error),
        }
    }
}

impl From<SafeResult> for SafeParse {
    fn from(result: SafeResult) -> Self {
        match result {
            Validation::Success(data) => SafeParse::Success { data },
            Validation::Failure(error) => SafeParse::Failure { error },
        }
    }
}

/// Validates `input`, returning the output or the error.
///
/// # Example
///
/// ```rust
/// use assay::{parse, Schema, Value};
///
/// let out = parse(&Schema::string(), &Value::from("hi")).unwrap();
/// assert_eq!(out, Value::from("hi"));
///
/// let err = parse(&Schema::string(), &Value::from(1)).unwrap_err();
/// assert_eq!(err.message(), "Expected string");
/// ```
pub fn parse(schema: &Schema, input: &Value) -> Result<Value, ValidationError> {
    schema.parse(input)
}

/// Validates `input` without failing, adapting the safe mode's
/// `ok`/`value` shape to `success`/`data`.
pub fn safe_parse(schema: &Schema, input: &Value) -> SafeParse {
    SafeParse::from(schema.safe(input))
}
