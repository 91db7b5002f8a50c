//! Introspection metadata attached to validators.
//!
//! Metadata is descriptive only: it never influences whether a validator
//! accepts an input. Each [`Schema`] owns a shared metadata cell, set at
//! construction time by the built-in constructors and freely updated
//! afterwards.
//!
//! Composition rules:
//!
//! - [`Metadata::merge`] combines the metadata of pipe steps: the first
//!   step's `kind`, the union of all constraints (later keys win), and the
//!   last defined documentation fields and `inner`.
//! - [`Metadata::wrap`] describes a wrapper around one validator: its own
//!   `kind`, `inner` pointing at the wrapped validator, the wrapped
//!   validator's documentation carried forward, and fresh constraints.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::asynchronous::AsyncSchema;
use crate::schema::Schema;

/// Constraint values keyed by name (e.g., `minLength`).
pub type Constraints = IndexMap<String, serde_json::Value>;

/// A reference to a child validator of either flavor.
#[derive(Clone)]
pub enum SchemaRef {
    Sync(Schema),
    Async(AsyncSchema),
}

impl SchemaRef {
    /// Returns the child's current metadata.
    pub fn metadata(&self) -> Option<Metadata> {
        match self {
            SchemaRef::Sync(schema) => schema.metadata(),
            SchemaRef::Async(schema) => schema.metadata(),
        }
    }

    /// Returns the child's type tag, if it carries metadata.
    pub fn kind(&self) -> Option<String> {
        self.metadata().map(|m| m.kind)
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRef::Sync(schema) => fmt::Debug::fmt(schema, f),
            SchemaRef::Async(schema) => fmt::Debug::fmt(schema, f),
        }
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Sync(schema)
    }
}

impl From<&Schema> for SchemaRef {
    fn from(schema: &Schema) -> Self {
        SchemaRef::Sync(schema.clone())
    }
}

impl From<AsyncSchema> for SchemaRef {
    fn from(schema: AsyncSchema) -> Self {
        SchemaRef::Async(schema)
    }
}

impl From<&AsyncSchema> for SchemaRef {
    fn from(schema: &AsyncSchema) -> Self {
        SchemaRef::Async(schema.clone())
    }
}

/// The child validators a combinator was built from.
#[derive(Debug, Clone)]
pub enum Inner {
    /// A single wrapped validator (modifiers, array items, set items).
    One(SchemaRef),
    /// Alternatives or sequential parts (union, variant, intersect).
    Many(Vec<SchemaRef>),
    /// Declared object fields, plus the validator for other keys.
    Shape {
        fields: IndexMap<String, SchemaRef>,
        rest: Option<Box<SchemaRef>>,
    },
    /// Positional tuple items, plus the validator for extra items.
    Items {
        items: Vec<SchemaRef>,
        rest: Option<Box<SchemaRef>>,
    },
    /// Key and value validators (record, map).
    Entry {
        key: Box<SchemaRef>,
        value: Box<SchemaRef>,
    },
}

/// Descriptive data attached to a validator.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Type tag, e.g. `"string"`, `"object"`, `"optional"`.
    pub kind: String,
    pub constraints: Constraints,
    pub inner: Option<Inner>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub examples: Option<Vec<serde_json::Value>>,
    pub default: Option<serde_json::Value>,
    pub deprecated: Option<bool>,
    /// Nominal typing tag that must match exactly.
    pub brand: Option<String>,
    /// Nominal typing tag that is advisory only.
    pub flavor: Option<String>,
    pub readonly: Option<bool>,
}

impl Metadata {
    /// Creates metadata with only a type tag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Adds one constraint and returns self for chaining.
    pub fn with_constraint(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.constraints.insert(name.into(), value.into());
        self
    }

    /// Sets the child references and returns self for chaining.
    pub fn with_inner(mut self, inner: Inner) -> Self {
        self.inner = Some(inner);
        self
    }

    /// Merges the metadata of sequential steps.
    ///
    /// Returns `None` if no step carries metadata and passes a lone entry
    /// through unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::Metadata;
    ///
    /// let merged = Metadata::merge(vec![
    ///     Some(Metadata::new("string")),
    ///     None,
    ///     Some(Metadata::new("min_length").with_constraint("minLength", 3)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(merged.kind, "string");
    /// assert_eq!(merged.constraints["minLength"], 3);
    /// ```
    pub fn merge<I>(steps: I) -> Option<Metadata>
    where
        I: IntoIterator<Item = Option<Metadata>>,
    {
        let mut present = steps.into_iter().flatten();
        let mut merged = present.next()?;

        for mut step in present {
            merged.constraints.extend(std::mem::take(&mut step.constraints));
            if let Some(inner) = step.inner.take() {
                merged.inner = Some(inner);
            }
            merged.absorb_docs(step);
        }
        Some(merged)
    }

    /// Describes a wrapper of kind `kind` around `inner`.
    ///
    /// The wrapped validator's description, title, examples, brand and
    /// flavor carry forward; its constraints do not.
    pub fn wrap(
        kind: impl Into<String>,
        inner: impl Into<SchemaRef>,
        constraints: Option<Constraints>,
    ) -> Metadata {
        let inner = inner.into();
        let mut wrapped = Metadata::new(kind);
        if let Some(source) = inner.metadata() {
            wrapped.description = source.description;
            wrapped.title = source.title;
            wrapped.examples = source.examples;
            wrapped.brand = source.brand;
            wrapped.flavor = source.flavor;
        }
        wrapped.constraints = constraints.unwrap_or_default();
        wrapped.inner = Some(Inner::One(inner));
        wrapped
    }

    /// Applies a partial update field by field.
    pub fn apply(&mut self, update: MetadataUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(constraints) = update.constraints {
            self.constraints = constraints;
        }
        if let Some(inner) = update.inner {
            self.inner = Some(inner);
        }
        set_if_some(&mut self.description, update.description);
        set_if_some(&mut self.title, update.title);
        set_if_some(&mut self.examples, update.examples);
        set_if_some(&mut self.default, update.default);
        set_if_some(&mut self.deprecated, update.deprecated);
        set_if_some(&mut self.brand, update.brand);
        set_if_some(&mut self.flavor, update.flavor);
        set_if_some(&mut self.readonly, update.readonly);
    }

    /// Last-defined-wins for the documentation fields.
    fn absorb_docs(&mut self, later: Metadata) {
        set_if_some(&mut self.description, later.description);
        set_if_some(&mut self.title, later.title);
        set_if_some(&mut self.examples, later.examples);
        set_if_some(&mut self.default, later.default);
        set_if_some(&mut self.deprecated, later.deprecated);
        set_if_some(&mut self.brand, later.brand);
        set_if_some(&mut self.flavor, later.flavor);
        set_if_some(&mut self.readonly, later.readonly);
    }
}

fn set_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// A partial metadata change for [`Schema::update_metadata`].
///
/// Only fields set to `Some` are written.
#[derive(Debug, Clone, Default)]
pub struct MetadataUpdate {
    pub kind: Option<String>,
    pub constraints: Option<Constraints>,
    pub inner: Option<Inner>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub examples: Option<Vec<serde_json::Value>>,
    pub default: Option<serde_json::Value>,
    pub deprecated: Option<bool>,
    pub brand: Option<String>,
    pub flavor: Option<String>,
    pub readonly: Option<bool>,
}

impl MetadataUpdate {
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self {
            title: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }
}

/// The metadata slot shared by all clones of one validator handle.
#[derive(Clone, Default)]
pub(crate) struct MetadataCell(Arc<RwLock<Option<Metadata>>>);

impl MetadataCell {
    pub(crate) fn new(metadata: Option<Metadata>) -> Self {
        Self(Arc::new(RwLock::new(metadata)))
    }

    pub(crate) fn get(&self) -> Option<Metadata> {
        self.0.read().clone()
    }

    pub(crate) fn kind(&self) -> Option<String> {
        self.0.read().as_ref().map(|m| m.kind.clone())
    }

    pub(crate) fn set(&self, metadata: Metadata) {
        *self.0.write() = Some(metadata);
    }

    /// Shallow-merges `update`, or creates metadata when none exists and the
    /// update names a kind. Returns false if nothing was written.
    pub(crate) fn update(&self, update: MetadataUpdate) -> bool {
        let mut slot = self.0.write();
        match slot.as_mut() {
            Some(existing) => {
                existing.apply(update);
                true
            }
            None => match update.kind.clone() {
                Some(kind) => {
                    let mut created = Metadata::new(kind);
                    created.apply(update);
                    *slot = Some(created);
                    true
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documented(kind: &str, description: &str) -> Metadata {
        Metadata {
            description: Some(description.to_string()),
            ..Metadata::new(kind)
        }
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert!(Metadata::merge(vec![None, None]).is_none());
        assert!(Metadata::merge(Vec::new()).is_none());
    }

    #[test]
    fn test_merge_single_passes_through() {
        let meta = documented("string", "a name").with_constraint("minLength", 1);
        let merged = Metadata::merge(vec![None, Some(meta)]).unwrap();
        assert_eq!(merged.kind, "string");
        assert_eq!(merged.description.as_deref(), Some("a name"));
        assert_eq!(merged.constraints["minLength"], json!(1));
    }

    #[test]
    fn test_merge_constraints_later_wins() {
        let merged = Metadata::merge(vec![
            Some(Metadata::new("number").with_constraint("minimum", 0)),
            Some(Metadata::new("check").with_constraint("maximum", 10)),
            Some(Metadata::new("check").with_constraint("minimum", 5)),
        ])
        .unwrap();

        assert_eq!(merged.kind, "number");
        assert_eq!(merged.constraints["minimum"], json!(5));
        assert_eq!(merged.constraints["maximum"], json!(10));
    }

    #[test]
    fn test_merge_docs_last_defined_wins() {
        let merged = Metadata::merge(vec![
            Some(documented("string", "first")),
            Some(Metadata {
                title: Some("Title".to_string()),
                ..Metadata::new("check")
            }),
            Some(Metadata::new("check")),
        ])
        .unwrap();

        assert_eq!(merged.description.as_deref(), Some("first"));
        assert_eq!(merged.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_cell_update_requires_kind_when_empty() {
        let cell = MetadataCell::default();
        assert!(!cell.update(MetadataUpdate::description("nothing to attach to")));
        assert!(cell.get().is_none());

        let update = MetadataUpdate {
            description: Some("created".to_string()),
            ..MetadataUpdate::kind("custom")
        };
        assert!(cell.update(update));
        let meta = cell.get().unwrap();
        assert_eq!(meta.kind, "custom");
        assert_eq!(meta.description.as_deref(), Some("created"));
    }

    #[test]
    fn test_cell_update_is_shallow() {
        let cell = MetadataCell::new(Some(
            documented("string", "old").with_constraint("minLength", 2),
        ));
        cell.update(MetadataUpdate::title("New"));

        let meta = cell.get().unwrap();
        assert_eq!(meta.kind, "string");
        assert_eq!(meta.description.as_deref(), Some("old"));
        assert_eq!(meta.title.as_deref(), Some("New"));
        assert_eq!(meta.constraints.len(), 1);
    }
}
