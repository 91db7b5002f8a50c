//! Async pipes and the async-only actions.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use stillwater::Validation;

use crate::error::ValidationError;
use crate::metadata::Metadata;
use crate::outcome::SafeResult;
use crate::schema::pipe::{apply_map, MapFn};
use crate::schema::{PipeStep, Schema, INVALID_INPUT};
use crate::value::Value;

use super::{call_async, AsyncSchema, ValidateAsync};

/// One stage of an [`AsyncSchema::pipe`].
#[derive(Clone)]
pub enum AsyncPipeStep {
    Validator(AsyncSchema),
    Map(MapFn),
}

impl AsyncPipeStep {
    /// Wraps a mapping function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        AsyncPipeStep::Map(Arc::new(f))
    }

    fn metadata(&self) -> Option<Metadata> {
        match self {
            AsyncPipeStep::Validator(schema) => schema.metadata(),
            AsyncPipeStep::Map(_) => None,
        }
    }
}

impl From<AsyncSchema> for AsyncPipeStep {
    fn from(schema: AsyncSchema) -> Self {
        AsyncPipeStep::Validator(schema)
    }
}

impl From<Schema> for AsyncPipeStep {
    fn from(schema: Schema) -> Self {
        AsyncPipeStep::Validator(AsyncSchema::from(schema))
    }
}

impl From<PipeStep> for AsyncPipeStep {
    fn from(step: PipeStep) -> Self {
        match step {
            PipeStep::Validator(schema) => AsyncPipeStep::from(schema),
            PipeStep::Map(f) => AsyncPipeStep::Map(f),
        }
    }
}

impl fmt::Debug for AsyncPipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncPipeStep::Validator(schema) => f.debug_tuple("Validator").field(schema).finish(),
            AsyncPipeStep::Map(_) => f.write_str("Map(..)"),
        }
    }
}

struct AsyncPipe {
    steps: Vec<AsyncPipeStep>,
}

impl ValidateAsync for AsyncPipe {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let mut value = input.clone();
            for step in &self.steps {
                value = match step {
                    AsyncPipeStep::Validator(schema) => schema.parse(&value).await?,
                    AsyncPipeStep::Map(f) => apply_map(f, value)?,
                };
            }
            Ok(value)
        }
        .boxed()
    }

    fn validate_safe<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, SafeResult> {
        async move {
            let mut value = input.clone();
            for step in &self.steps {
                let outcome = match step {
                    AsyncPipeStep::Validator(schema) => schema.safe(&value).await,
                    AsyncPipeStep::Map(f) => match apply_map(f, value) {
                        Ok(out) => Validation::Success(out),
                        Err(error) => Validation::Failure(error.message().to_string()),
                    },
                };
                match outcome {
                    Validation::Success(out) => value = out,
                    failure => return failure,
                }
            }
            Validation::Success(value)
        }
        .boxed()
    }
}

struct AsyncCheck<P> {
    predicate: P,
    message: String,
}

impl<P, Fut> ValidateAsync for AsyncCheck<P>
where
    P: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            if call_async(&self.predicate, input.clone()).await? {
                Ok(input.clone())
            } else {
                Err(ValidationError::new(self.message.clone()).with_code("custom"))
            }
        }
        .boxed()
    }
}

struct AsyncTransform<F> {
    transform: F,
}

impl<F, Fut> ValidateAsync for AsyncTransform<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Value> + Send + 'static,
{
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        call_async(&self.transform, input.clone()).boxed()
    }
}

impl AsyncSchema {
    /// Async [`Schema::pipe`](crate::Schema::pipe). Steps are awaited in
    /// order and the first failure ends the pipe.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{AsyncPipeStep, AsyncSchema, Schema, Value};
    /// use futures::executor::block_on;
    ///
    /// let handle = AsyncSchema::pipe([
    ///     AsyncPipeStep::from(Schema::string()),
    ///     AsyncPipeStep::from(AsyncSchema::check_async_with(
    ///         |v: Value| async move { v.as_str() != Some("root") },
    ///         "Handle is taken",
    ///     )),
    /// ]);
    ///
    /// assert!(block_on(handle.parse(&Value::from("ada"))).is_ok());
    /// assert_eq!(
    ///     block_on(handle.parse(&Value::from("root"))).unwrap_err().message(),
    ///     "Handle is taken"
    /// );
    /// ```
    pub fn pipe<I>(steps: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncPipeStep>,
    {
        let steps: Vec<AsyncPipeStep> = steps.into_iter().map(Into::into).collect();
        let metadata = Metadata::merge(steps.iter().map(AsyncPipeStep::metadata));
        AsyncSchema::with_metadata(AsyncPipe { steps }, metadata)
    }

    /// Fails with `"Invalid input"` when the predicate resolves to false.
    pub fn check_async<P, Fut>(predicate: P) -> AsyncSchema
    where
        P: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        AsyncSchema::check_async_with(predicate, INVALID_INPUT)
    }

    /// Fails with `message` when the predicate resolves to false.
    pub fn check_async_with<P, Fut>(predicate: P, message: impl Into<String>) -> AsyncSchema
    where
        P: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let check = AsyncCheck {
            predicate,
            message: message.into(),
        };
        AsyncSchema::build(check, Metadata::new("check"))
    }

    /// Replaces the value with the transform's result.
    pub fn transform_async<F, Fut>(transform: F) -> AsyncSchema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        AsyncSchema::build(AsyncTransform { transform }, Metadata::new("transform"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_async_pipe_mixes_sync_and_async_steps() {
        let schema = AsyncSchema::pipe([
            AsyncPipeStep::from(Schema::string()),
            AsyncPipeStep::from(AsyncSchema::transform_async(|v: Value| async move {
                Value::from(v.as_str().unwrap_or_default().to_uppercase())
            })),
            AsyncPipeStep::map(|v| v),
            AsyncPipeStep::from(Schema::min_length(2)),
        ]);
        assert_eq!(schema.parse(&Value::from("ab")).await.unwrap(), Value::from("AB"));
        assert_eq!(
            schema.safe(&Value::from("a")).await,
            Validation::Failure("Length must be at least 2, got 1".to_string())
        );
    }

    #[tokio::test]
    async fn test_async_pipe_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = AsyncSchema::pipe([
            AsyncPipeStep::from(Schema::number()),
            AsyncPipeStep::from(AsyncSchema::check_async(move |_: Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { true }
            })),
        ]);

        assert!(schema.parse(&Value::from("x")).await.is_err());
        assert!(schema.safe(&Value::from("x")).await.is_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_async_pipe_merges_metadata() {
        let schema = AsyncSchema::pipe([Schema::string(), Schema::max_length(4)]);
        let meta = schema.metadata().unwrap();
        assert_eq!(meta.kind, "string");
        assert_eq!(meta.constraints["maxLength"], serde_json::json!(4));
    }

    #[tokio::test]
    async fn test_check_async_default_message() {
        let schema = AsyncSchema::check_async(|_: Value| async { false });
        assert_eq!(
            schema.parse(&Value::Null).await.unwrap_err().message(),
            INVALID_INPUT
        );
    }
}
