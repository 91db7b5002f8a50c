//! The error returned by the throwing validation mode.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use super::issue::{Issue, Issues};
use crate::path::PathSegment;

/// Message used when a user callback fails with a value that carries no text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A rejected input.
///
/// `message` is the flat rendering: every composite the failure passed
/// through has prefixed its key or index (`"users: [0]: name: Expected
/// string"`). `issues` hold the same failure with the leaf message and a
/// structured path instead.
///
/// # Example
///
/// ```rust
/// use assay::ValidationError;
///
/// let error = ValidationError::new("Expected string").at_key("name");
///
/// assert_eq!(error.message(), "name: Expected string");
/// assert_eq!(error.issues().first().message, "Expected string");
/// assert_eq!(error.issues().first().path.to_string(), "name");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    issues: Issues,
}

impl ValidationError {
    /// Creates an error with a single root-level issue.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_issue(Issue::new(message))
    }

    /// Creates a type-mismatch error (`invalid_type`).
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::from_issue(Issue::new(message).with_code("invalid_type"))
    }

    /// Creates an error from one issue. The flat message is the issue's
    /// message; its path is only exposed through [`issues`](Self::issues).
    pub fn from_issue(issue: Issue) -> Self {
        Self {
            message: issue.message.clone(),
            issues: Issues::single(issue),
        }
    }

    /// Creates an error whose flat message is the first issue's message.
    pub fn from_issues(issues: Issues) -> Self {
        Self {
            message: issues.first().message.clone(),
            issues,
        }
    }

    /// Normalizes an error raised by user code.
    pub fn foreign<E: Display>(error: E) -> Self {
        Self::from_issue(Issue::new(error.to_string()).with_code("custom"))
    }

    /// Normalizes a panic payload caught at a callback boundary.
    ///
    /// String payloads keep their text; anything else becomes
    /// [`UNKNOWN_ERROR`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            UNKNOWN_ERROR.to_string()
        };
        tracing::warn!(message = %message, "validator callback panicked");
        Self::from_issue(Issue::new(message).with_code("custom"))
    }

    /// Sets the code of every issue and returns self for chaining.
    pub fn with_code(self, code: &str) -> Self {
        Self {
            message: self.message,
            issues: self.issues.map(|issue| issue.with_code(code)),
        }
    }

    /// Returns the flat, prefixed message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured issues.
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    /// Consumes the error, returning its structured issues.
    pub fn into_issues(self) -> Issues {
        self.issues
    }

    /// Attributes the failure to an object-like key: `"K: msg"`.
    pub fn at_key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        let prefix = format!("{}: ", key);
        self.within(PathSegment::Field(key), prefix)
    }

    /// Attributes the failure to an array-like index: `"[i]: msg"`.
    pub fn at_index(self, index: usize) -> Self {
        self.within(PathSegment::Index(index), format!("[{}]: ", index))
    }

    /// Attributes the failure to `segment`, prefixing the flat message with
    /// `prefix` verbatim.
    pub fn within(self, segment: PathSegment, prefix: impl Display) -> Self {
        Self {
            message: format!("{}{}", prefix, self.message),
            issues: self.issues.prepend(&segment),
        }
    }
}

/// Runs a user callback, converting a panic into a [`ValidationError`].
pub(crate) fn guard<T>(
    callback: impl FnOnce() -> Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(result) => result,
        Err(payload) => Err(ValidationError::from_panic(payload)),
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};
