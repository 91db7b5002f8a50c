//! Async modifiers.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::ValidationError;
use crate::metadata::Metadata;
use crate::schema::modifiers::{reject_absent, Absent};
use crate::schema::Fallback;
use crate::value::Value;

use super::{AsyncSchema, ValidateAsync};

struct AsyncPassThrough {
    inner: AsyncSchema,
    absent: Absent,
}

impl ValidateAsync for AsyncPassThrough {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            if self.absent.matches(input) {
                Ok(input.clone())
            } else {
                self.inner.parse(input).await
            }
        }
        .boxed()
    }
}

struct AsyncRejectAbsent {
    inner: AsyncSchema,
    absent: Absent,
}

impl ValidateAsync for AsyncRejectAbsent {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move { reject_absent(self.absent, self.inner.parse(input).await?) }.boxed()
    }
}

struct AsyncFallback {
    inner: AsyncSchema,
    fallback: Fallback,
}

impl ValidateAsync for AsyncFallback {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            match self.inner.parse(input).await {
                Ok(value) => Ok(value),
                Err(cause) => self.fallback.resolve(&cause),
            }
        }
        .boxed()
    }
}

impl AsyncSchema {
    fn pass_through(self, kind: &str, absent: Absent) -> AsyncSchema {
        let metadata = Metadata::wrap(kind, &self, None);
        AsyncSchema::build(AsyncPassThrough { inner: self, absent }, metadata)
    }

    fn reject(self, kind: &str, absent: Absent) -> AsyncSchema {
        let metadata = Metadata::wrap(kind, &self, None);
        AsyncSchema::build(AsyncRejectAbsent { inner: self, absent }, metadata)
    }

    /// Lets `undefined` through without awaiting the wrapped validator.
    pub fn optional(self) -> AsyncSchema {
        self.pass_through("optional", Absent::Undefined)
    }

    pub fn exact_optional(self) -> AsyncSchema {
        self.pass_through("exact_optional", Absent::Undefined)
    }

    pub fn nullable(self) -> AsyncSchema {
        self.pass_through("nullable", Absent::Null)
    }

    pub fn nullish(self) -> AsyncSchema {
        self.pass_through("nullish", Absent::Either)
    }

    /// Rejects a `null` output of the wrapped validator.
    pub fn non_nullable(self) -> AsyncSchema {
        self.reject("non_nullable", Absent::Null)
    }

    pub fn non_nullish(self) -> AsyncSchema {
        self.reject("non_nullish", Absent::Either)
    }

    pub fn non_optional(self) -> AsyncSchema {
        self.reject("non_optional", Absent::Undefined)
    }

    /// Returns `value` whenever this validator fails.
    pub fn fallback(self, value: impl Into<Value>) -> AsyncSchema {
        self.fallback_to(Fallback::Value(value.into()))
    }

    pub fn fallback_with<F>(self, produce: F) -> AsyncSchema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.fallback_to(Fallback::Compute(Arc::new(produce)))
    }

    pub fn fallback_to(self, fallback: Fallback) -> AsyncSchema {
        let mut metadata = Metadata::wrap("fallback", &self, None);
        metadata.default = fallback.default_json();
        AsyncSchema::build(
            AsyncFallback {
                inner: self,
                fallback,
            },
            metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_async_optional_skips_inner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = AsyncSchema::custom_async(move |input: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<Value, String>(input) }
        })
        .optional();

        assert_eq!(schema.parse(&Value::Undefined).await.unwrap(), Value::Undefined);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(schema.parse(&Value::from(1)).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_non_nullish() {
        let schema = AsyncSchema::from(Schema::any()).non_nullish();
        assert_eq!(
            schema.parse(&Value::Null).await.unwrap_err().message(),
            "Value cannot be null or undefined"
        );
    }

    #[tokio::test]
    async fn test_async_fallback() {
        let schema = AsyncSchema::from(Schema::string()).fallback("anonymous");
        assert_eq!(
            schema.parse(&Value::from(5)).await.unwrap(),
            Value::from("anonymous")
        );
        assert!(schema.safe(&Value::Null).await.is_success());
    }
}
