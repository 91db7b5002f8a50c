//! Asynchronous validators.
//!
//! [`AsyncSchema`] mirrors [`Schema`] with the same three modes, except
//! that each returns a future. Any sync schema converts into an async one
//! (`AsyncSchema::from(schema)`), sharing its metadata slot, so sync leaves
//! compose freely with async callbacks such as [`AsyncSchema::check_async`].
//!
//! Collections await their children one at a time, in input order, and
//! stop at the first failure. Error messages and paths are rendered
//! exactly as in the sync combinators.
//!
//! # Example
//!
//! ```rust
//! use assay::{AsyncSchema, Schema, Value};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let user = AsyncSchema::object([
//!     ("name", AsyncSchema::from(Schema::string())),
//!     (
//!         "email",
//!         AsyncSchema::check_async(|v: Value| async move {
//!             v.as_str().map_or(false, |s| s.contains('@'))
//!         }),
//!     ),
//! ]);
//!
//! let input = Value::from(json!({"name": "Ada", "email": "ada.example.com"}));
//! let err = block_on(user.parse(&input)).unwrap_err();
//! assert_eq!(err.message(), "email: Invalid input");
//! ```

mod collections;
mod combinators;
mod modifiers;
mod object;
mod pipe;

use std::fmt::{self, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

pub use pipe::AsyncPipeStep;

use crate::error::{guard, ValidationError};
use crate::metadata::{Metadata, MetadataCell, MetadataUpdate};
use crate::outcome::{to_safe, SafeResult, StandardResult, STANDARD_VERSION, VENDOR};
use crate::schema::{override_message, Schema};
use crate::value::Value;

/// The asynchronous validator contract.
///
/// Implementors write the throwing mode; safe and standard default to it.
pub trait ValidateAsync: Send + Sync {
    /// Throwing mode.
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>>;

    /// Safe mode, derived from [`validate`](Self::validate).
    fn validate_safe<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, SafeResult> {
        self.validate(input).map(to_safe).boxed()
    }

    /// Standard mode, derived from [`validate`](Self::validate).
    fn validate_standard<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, StandardResult> {
        self.validate(input).map(StandardResult::from).boxed()
    }
}

/// A shareable asynchronous validator handle.
#[derive(Clone)]
pub struct AsyncSchema {
    validator: Arc<dyn ValidateAsync>,
    metadata: MetadataCell,
}

impl AsyncSchema {
    /// Wraps a [`ValidateAsync`] implementation. No metadata is attached.
    pub fn new<V>(validator: V) -> Self
    where
        V: ValidateAsync + 'static,
    {
        Self {
            validator: Arc::new(validator),
            metadata: MetadataCell::default(),
        }
    }

    pub(crate) fn build<V>(validator: V, metadata: Metadata) -> Self
    where
        V: ValidateAsync + 'static,
    {
        Self::with_metadata(validator, Some(metadata))
    }

    pub(crate) fn with_metadata<V>(validator: V, metadata: Option<Metadata>) -> Self
    where
        V: ValidateAsync + 'static,
    {
        Self {
            validator: Arc::new(validator),
            metadata: MetadataCell::new(metadata),
        }
    }

    /// Builds a validator from an async throwing operation.
    ///
    /// `Err` values surface their `Display` text; panics while creating or
    /// polling the future are normalized like [`Schema::from_fn`].
    pub fn custom_async<F, Fut, E>(parse: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Display,
    {
        Self::build(CustomAsync { parse }, Metadata::new("custom"))
    }

    /// Throwing mode.
    pub async fn parse(&self, input: &Value) -> Result<Value, ValidationError> {
        self.validator.validate(input).await
    }

    /// Safe mode.
    pub async fn safe(&self, input: &Value) -> SafeResult {
        self.validator.validate_safe(input).await
    }

    /// Standard introspection entry point.
    pub fn standard(&self) -> AsyncStandard<'_> {
        AsyncStandard { schema: self }
    }

    pub fn metadata(&self) -> Option<Metadata> {
        self.metadata.get()
    }

    pub fn kind(&self) -> Option<String> {
        self.metadata.kind()
    }

    pub fn set_metadata(&self, metadata: Metadata) {
        self.metadata.set(metadata);
    }

    /// See [`Schema::update_metadata`].
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
    pub fn error(self, message: impl Into<String>) -> Self {
        let metadata = Metadata::wrap("error", &self, None);
        Self::build(
            AsyncMessageOverride {
                inner: self,
                message: message.into(),
            },
            metadata,
        )
    }
}

impl From<Schema> for AsyncSchema {
    fn from(schema: Schema) -> Self {
        Self {
            metadata: schema.metadata_cell().clone(),
            validator: Arc::new(SyncAdapter(schema)),
        }
    }
}

impl From<&Schema> for AsyncSchema {
    fn from(schema: &Schema) -> Self {
        AsyncSchema::from(schema.clone())
    }
}

impl ValidateAsync for AsyncSchema {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        self.validator.validate(input)
    }

    fn validate_safe<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, SafeResult> {
        self.validator.validate_safe(input)
    }

    fn validate_standard<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, StandardResult> {
        self.validator.validate_standard(input)
    }
}

impl fmt::Debug for AsyncSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncSchema")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// The standard introspection protocol view of an [`AsyncSchema`].
#[derive(Debug, Clone, Copy)]
pub struct AsyncStandard<'a> {
    schema: &'a AsyncSchema,
}

impl AsyncStandard<'_> {
    /// Always 1.
    pub fn version(&self) -> u32 {
        STANDARD_VERSION
    }

    /// See [`Standard::vendor`](crate::Standard::vendor).
    pub fn vendor(&self) -> &'static str {
        VENDOR
    }

    /// Async standard mode.
    pub async fn validate(&self, input: &Value) -> StandardResult {
        self.schema.validator.validate_standard(input).await
    }
}

/// Runs a user future, converting a panic during polling into a
/// [`ValidationError`].
pub(crate) async fn guard_future<T, Fut>(fut: Fut) -> Result<T, ValidationError>
where
    Fut: Future<Output = Result<T, ValidationError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ValidationError::from_panic(payload)),
    }
}

/// Calls a user callback that returns a future and awaits it, normalizing
/// panics at both stages.
pub(crate) async fn call_async<F, Fut, T>(callback: &F, input: Value) -> Result<T, ValidationError>
where
    F: Fn(Value) -> Fut,
    Fut: Future<Output = T>,
{
    let pending = guard(|| Ok(callback(input)))?;
    guard_future(pending.map(Ok)).await
}

/// Runs a sync schema inside the async contract.
struct SyncAdapter(Schema);

impl ValidateAsync for SyncAdapter {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        future::ready(self.0.parse(input)).boxed()
    }

    fn validate_safe<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, SafeResult> {
        future::ready(self.0.safe(input)).boxed()
    }

    fn validate_standard<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, StandardResult> {
        future::ready(self.0.standard().validate(input)).boxed()
    }
}

struct CustomAsync<F> {
    parse: F,
}

impl<F, Fut, E> ValidateAsync for CustomAsync<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, E>> + Send + 'static,
    E: Display,
{
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            call_async(&self.parse, input.clone())
                .await?
                .map_err(ValidationError::foreign)
        }
        .boxed()
    }
}

struct AsyncMessageOverride {
    inner: AsyncSchema,
    message: String,
}

impl ValidateAsync for AsyncMessageOverride {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            self.inner
                .parse(input)
                .await
                .map_err(|error| override_message(&error, &self.message))
        }
        .boxed()
    }
}
