//! Error types for validation failures.
//!
//! A failure has two renderings that always describe the same cause:
//! a flat, prefixed message (returned by the throwing and safe modes) and a
//! list of structured [`Issue`]s whose paths locate the failure (returned by
//! the standard introspection mode).

mod issue;
mod validation_error;

pub use issue::{Issue, Issues};
pub use validation_error::{ValidationError, UNKNOWN_ERROR};

pub(crate) use validation_error::guard;
