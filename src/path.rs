//! Paths locating a failure inside a nested value.
//!
//! Composite validators report failures relative to themselves. As an error
//! travels outward, each parent *prepends* its own key or index, so the final
//! [`JsonPath`] reads from the outermost container down to the failing leaf.

use std::collections::VecDeque;
use std::fmt::{self, Display};

/// A segment of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object, record or map key (e.g., `user`, `email`).
    Field(String),
    /// An array, tuple or set position (e.g., `[0]`, `[42]`).
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// A path to a value in a nested structure.
///
/// # Example
///
/// ```rust
/// use assay::JsonPath;
///
/// let path = JsonPath::from_field("email")
///     .prepend_index(0)
///     .prepend_field("users");
///
/// assert_eq!(path.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: VecDeque<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self::root().prepend_field(name)
    }

    /// Creates a path from a single index segment.
    pub fn from_index(idx: usize) -> Self {
        Self::root().prepend_index(idx)
    }

    /// Returns this path with `segment` placed in front of it.
    pub fn prepend(mut self, segment: PathSegment) -> Self {
        self.segments.push_front(segment);
        self
    }

    /// Returns this path with a field segment placed in front of it.
    pub fn prepend_field(self, name: impl Into<String>) -> Self {
        self.prepend(PathSegment::Field(name.into()))
    }

    /// Returns this path with an index segment placed in front of it.
    pub fn prepend_index(self, index: usize) -> Self {
        self.prepend(PathSegment::Index(index))
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the first segment, or None if this is root.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.front()
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.back()
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for JsonPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}
