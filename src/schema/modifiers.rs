//! Modifiers adjusting how one validator treats particular values.
//!
//! Pass-through modifiers (`optional`, `nullable`, `nullish`,
//! `exact_optional`) return the matching input unchanged without calling
//! the wrapped validator. Rejecting modifiers (`non_nullable`,
//! `non_nullish`, `non_optional`) run the wrapped validator first and then
//! inspect its *output*. [`Schema::fallback`] turns every failure into a
//! success.

use std::fmt;
use std::sync::Arc;

use crate::error::{guard, ValidationError};
use crate::metadata::Metadata;
use crate::value::Value;

use super::traits::Validate;
use super::Schema;

/// Which absent-like values a modifier singles out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Absent {
    Undefined,
    Null,
    Either,
}

impl Absent {
    pub(crate) fn matches(self, value: &Value) -> bool {
        match self {
            Absent::Undefined => value.is_undefined(),
            Absent::Null => value.is_null(),
            Absent::Either => value.is_nullish(),
        }
    }

    pub(crate) fn rejection(self) -> &'static str {
        match self {
            Absent::Undefined => "Value cannot be undefined",
            Absent::Null => "Value cannot be null",
            Absent::Either => "Value cannot be null or undefined",
        }
    }
}

pub(crate) fn reject_absent(absent: Absent, output: Value) -> Result<Value, ValidationError> {
    if absent.matches(&output) {
        Err(ValidationError::new(absent.rejection()).with_code("invalid_type"))
    } else {
        Ok(output)
    }
}

/// The value [`Schema::fallback`] substitutes for a failure.
#[derive(Clone)]
pub enum Fallback {
    /// A fixed value.
    Value(Value),
    /// Computed afresh for every failure.
    Compute(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Fallback {
    /// Produces the substitute value. A panicking producer is normalized
    /// into an error.
    pub(crate) fn resolve(&self, cause: &ValidationError) -> Result<Value, ValidationError> {
        tracing::debug!(cause = %cause, "substituting fallback value");
        match self {
            Fallback::Value(value) => Ok(value.clone()),
            Fallback::Compute(produce) => guard(|| Ok(produce())),
        }
    }

    /// The fixed value as JSON, for metadata.
    pub(crate) fn default_json(&self) -> Option<serde_json::Value> {
        match self {
            Fallback::Value(value) => Some(value.to_json()),
            Fallback::Compute(_) => None,
        }
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

struct PassThrough {
    inner: Schema,
    absent: Absent,
}

impl Validate for PassThrough {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        if self.absent.matches(input) {
            Ok(input.clone())
        } else {
            self.inner.parse(input)
        }
    }
}

struct RejectAbsent {
    inner: Schema,
    absent: Absent,
}

impl Validate for RejectAbsent {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        reject_absent(self.absent, self.inner.parse(input)?)
    }
}

struct FallbackSchema {
    inner: Schema,
    fallback: Fallback,
}

impl Validate for FallbackSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        self.inner
            .parse(input)
            .or_else(|cause| self.fallback.resolve(&cause))
    }
}

impl Schema {
    fn wrap_with<V>(&self, kind: &str, validator: V) -> Schema
    where
        V: Validate + 'static,
    {
        Schema::build(validator, Metadata::wrap(kind, self, None))
    }

    /// Lets `undefined` through unchanged; everything else is validated.
    pub fn optional(self) -> Schema {
        self.wrap_with(
            "optional",
            PassThrough {
                inner: self.clone(),
                absent: Absent::Undefined,
            },
        )
    }

    /// Same runtime behavior as [`Schema::optional`], tagged
    /// `exact_optional` in metadata.
    pub fn exact_optional(self) -> Schema {
        self.wrap_with(
            "exact_optional",
            PassThrough {
                inner: self.clone(),
                absent: Absent::Undefined,
            },
        )
    }

    /// Lets `null` through unchanged; everything else is validated.
    pub fn nullable(self) -> Schema {
        self.wrap_with(
            "nullable",
            PassThrough {
                inner: self.clone(),
                absent: Absent::Null,
            },
        )
    }

    /// Lets `null` and `undefined` through unchanged.
    pub fn nullish(self) -> Schema {
        self.wrap_with(
            "nullish",
            PassThrough {
                inner: self.clone(),
                absent: Absent::Either,
            },
        )
    }

    /// Rejects a `null` output with `"Value cannot be null"`.
    pub fn non_nullable(self) -> Schema {
        self.wrap_with(
            "non_nullable",
            RejectAbsent {
                inner: self.clone(),
                absent: Absent::Null,
            },
        )
    }

    /// Rejects a `null` or `undefined` output.
    pub fn non_nullish(self) -> Schema {
        self.wrap_with(
            "non_nullish",
            RejectAbsent {
                inner: self.clone(),
                absent: Absent::Either,
            },
        )
    }

    /// Rejects an `undefined` output with `"Value cannot be undefined"`.
    pub fn non_optional(self) -> Schema {
        self.wrap_with(
            "non_optional",
            RejectAbsent {
                inner: self.clone(),
                absent: Absent::Undefined,
            },
        )
    }

    /// Returns `value` whenever this validator fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let port = Schema::number().fallback(8080);
    /// assert_eq!(port.parse(&Value::from("x")).unwrap(), Value::from(8080));
    /// assert_eq!(port.parse(&Value::from(3000)).unwrap(), Value::from(3000));
    /// ```
    pub fn fallback(self, value: impl Into<Value>) -> Schema {
        self.fallback_to(Fallback::Value(value.into()))
    }

    /// Returns the result of `produce` whenever this validator fails.
    /// `produce` is called once per failure.
    pub fn fallback_with<F>(self, produce: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.fallback_to(Fallback::Compute(Arc::new(produce)))
    }

    /// Returns `fallback` whenever this validator fails.
    pub fn fallback_to(self, fallback: Fallback) -> Schema {
        let mut metadata = Metadata::wrap("fallback", &self, None);
        metadata.default = fallback.default_json();
        Schema::build(
            FallbackSchema {
                inner: self,
                fallback,
            },
            metadata,
        )
    }
}
