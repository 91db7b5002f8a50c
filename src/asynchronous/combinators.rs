//! Async union, variant, intersect and lazy.

use futures::future::{BoxFuture, FutureExt};
use stillwater::Validation;

use crate::error::{guard, ValidationError};
use crate::metadata::Metadata;
use crate::schema::combinators::{many_metadata, no_union_match, no_variant_match};
use crate::schema::object::expect_object;
use crate::value::Value;

use super::{AsyncSchema, ValidateAsync};

/// Returns the first option's output that accepts `input`.
async fn first_match(options: &[AsyncSchema], input: &Value) -> Option<Value> {
    for option in options {
        if let Validation::Success(value) = option.safe(input).await {
            return Some(value);
        }
    }
    None
}

struct AsyncUnion {
    options: Vec<AsyncSchema>,
}

impl ValidateAsync for AsyncUnion {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            first_match(&self.options, input)
                .await
                .ok_or_else(no_union_match)
        }
        .boxed()
    }
}

struct AsyncVariant {
    key: String,
    options: Vec<AsyncSchema>,
}

impl ValidateAsync for AsyncVariant {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            expect_object(input)?;
            first_match(&self.options, input)
                .await
                .ok_or_else(|| no_variant_match(&self.key, input))
        }
        .boxed()
    }
}

struct AsyncIntersect {
    parts: Vec<AsyncSchema>,
}

impl ValidateAsync for AsyncIntersect {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let mut value = input.clone();
            for part in &self.parts {
                value = part.parse(&value).await?;
            }
            Ok(value)
        }
        .boxed()
    }
}

struct AsyncLazy<F> {
    getter: F,
}

impl<F> ValidateAsync for AsyncLazy<F>
where
    F: Fn() -> AsyncSchema + Send + Sync,
{
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let resolved = guard(|| Ok((self.getter)()))?;
            tracing::trace!(kind = ?resolved.kind(), "resolved lazy schema");
            resolved.parse(input).await
        }
        .boxed()
    }
}

fn collect<I>(items: I) -> Vec<AsyncSchema>
where
    I: IntoIterator,
    I::Item: Into<AsyncSchema>,
{
    items.into_iter().map(Into::into).collect()
}

impl AsyncSchema {
    /// Async [`Schema::union`](crate::Schema::union).
    pub fn union<I>(options: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        let options = collect(options);
        let metadata = many_metadata("union", &options);
        AsyncSchema::build(AsyncUnion { options }, metadata)
    }

    /// Async [`Schema::variant`](crate::Schema::variant).
    pub fn variant<I>(key: impl Into<String>, options: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        let key = key.into();
        let options = collect(options);
        let metadata =
            many_metadata("variant", &options).with_constraint("discriminator", key.clone());
        AsyncSchema::build(AsyncVariant { key, options }, metadata)
    }

    /// Async [`Schema::intersect`](crate::Schema::intersect).
    pub fn intersect<I>(parts: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        let parts = collect(parts);
        let metadata = many_metadata("intersect", &parts);
        AsyncSchema::build(AsyncIntersect { parts }, metadata)
    }

    /// Async [`Schema::lazy`](crate::Schema::lazy). `getter` runs on every
    /// validation.
    pub fn lazy<F>(getter: F) -> AsyncSchema
    where
        F: Fn() -> AsyncSchema + Send + Sync + 'static,
    {
        AsyncSchema::build(AsyncLazy { getter }, Metadata::new("lazy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    #[tokio::test]
    async fn test_async_union() {
        let schema = AsyncSchema::union([Schema::string(), Schema::number()]);
        assert_eq!(schema.parse(&Value::from(42)).await.unwrap(), Value::from(42));
        assert_eq!(
            schema.parse(&Value::from(true)).await.unwrap_err().message(),
            "No matching schema in union"
        );
    }

    #[tokio::test]
    async fn test_async_variant() {
        let schema = AsyncSchema::variant(
            "kind",
            [Schema::object([("kind", Schema::literal("a"))])],
        );
        assert_eq!(
            schema
                .parse(&Value::from(json!({"kind": 2})))
                .await
                .unwrap_err()
                .message(),
            "No matching variant for kind=2"
        );
    }

    #[tokio::test]
    async fn test_async_intersect_and_lazy() {
        let schema = AsyncSchema::intersect([
            AsyncSchema::lazy(|| AsyncSchema::from(Schema::number())),
            AsyncSchema::from(Schema::min_value(10.0)),
        ]);
        assert!(schema.parse(&Value::from(12)).await.is_ok());
        assert_eq!(
            schema.parse(&Value::from(3)).await.unwrap_err().message(),
            "Value must be at least 10, got 3"
        );
    }
}
