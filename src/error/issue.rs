//! Structured validation issues.
//!
//! This module provides [`Issue`] for a single located failure and
//! [`Issues`], the non-empty list carried by every [`ValidationError`].
//!
//! [`ValidationError`]: super::ValidationError

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::{JsonPath, PathSegment};

/// A single validation failure with its location.
///
/// The path is relative to the validator that reported the issue; parents
/// prepend their own key or index while the error travels outward.
///
/// # Example
///
/// ```rust
/// use assay::{Issue, JsonPath};
///
/// let issue = Issue::new("Expected string")
///     .with_code("invalid_type")
///     .with_path(JsonPath::from_field("name"));
///
/// assert_eq!(issue.to_string(), "name: Expected string");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Human-readable error message of the failing leaf.
    pub message: String,
    /// Where the failure originated; empty at the root.
    pub path: JsonPath,
    /// Machine-readable error code (e.g., `invalid_type`).
    pub code: String,
}

impl Issue {
    /// Creates a root-level issue with the default `validation_error` code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: JsonPath::root(),
            code: "validation_error".to_string(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the path and returns self for chaining.
    pub fn with_path(mut self, path: JsonPath) -> Self {
        self.path = path;
        self
    }

    /// Returns the path, or `None` for root-level issues.
    pub fn location(&self) -> Option<&JsonPath> {
        if self.path.is_root() {
            None
        } else {
            Some(&self.path)
        }
    }

    /// Places `segment` in front of this issue's path.
    pub fn prepend(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A non-empty collection of issues.
///
/// `Issues` wraps a `NonEmptyVec<Issue>` so a failure always carries at
/// least one issue. It implements `Semigroup` so callbacks that report
/// several issues can be combined in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct Issues(NonEmptyVec<Issue>);

impl Issues {
    /// Creates an `Issues` containing a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Creates an `Issues` from a `Vec<Issue>`, or `None` if it is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the issues in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns the first reported issue.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns all issues at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// Converts this collection into a `Vec<Issue>`.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Places `segment` in front of every issue's path.
    pub fn prepend(self, segment: &PathSegment) -> Self {
        self.map(|issue| issue.prepend(segment.clone()))
    }

    /// Applies `f` to every issue.
    pub(crate) fn map<F>(self, f: F) -> Self
    where
        F: FnMut(Issue) -> Issue,
    {
        Self(self.0.map(f))
    }
}

impl Semigroup for Issues {
    fn combine(self, other: Self) -> Self {
        Issues(self.0.combine(other.0))
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issues>();
    assert_sync::<Issues>();
};
