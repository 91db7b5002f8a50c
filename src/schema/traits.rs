//! The validator contract.
//!
//! This module provides the [`Validate`] trait every validator implements.
//! Implementors write the throwing mode once; the safe and standard modes
//! are derived from it mechanically, so all three always agree.

use crate::error::ValidationError;
use crate::outcome::{to_safe, SafeResult, StandardResult};
use crate::value::Value;

/// A unit of validation and transformation over [`Value`]s.
///
/// The `Send + Sync` bounds allow validators to be shared across threads
/// behind an `Arc`, which is how [`Schema`](super::Schema) stores them.
///
/// # Example
///
/// ```rust
/// use assay::{Schema, Validate, ValidationError, Value};
///
/// struct Even;
///
/// impl Validate for Even {
///     fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
///         match input.as_f64() {
///             Some(n) if n % 2.0 == 0.0 => Ok(input.clone()),
///             _ => Err(ValidationError::new("Expected even number")),
///         }
///     }
/// }
///
/// let even = Schema::new(Even);
/// assert!(even.parse(&Value::from(4)).is_ok());
/// assert!(even.safe(&Value::from(3)).is_failure());
/// ```
pub trait Validate: Send + Sync {
    /// Throwing mode: the output on success, the error on rejection.
    fn validate(&self, input: &Value) -> Result<Value, ValidationError>;

    /// Safe mode: `Success(value)` or `Failure(message)`.
    ///
    /// Defaults to [`validate`](Self::validate) with the error reduced to its
    /// flat message.
    fn validate_safe(&self, input: &Value) -> SafeResult {
        to_safe(self.validate(input))
    }

    /// Standard introspection mode: `{value}` or `{issues}`.
    ///
    /// Defaults to [`validate`](Self::validate) so issue paths survive.
    fn validate_standard(&self, input: &Value) -> StandardResult {
        StandardResult::from(self.validate(input))
    }
}
