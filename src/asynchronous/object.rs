//! Async objects, records and the partial/required wrappers.

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::metadata::{Inner, Metadata, SchemaRef};
use crate::schema::object::{
    expect_object, initial_output, insert_field, invalid_key, object_metadata,
    record_key, settle_required, UnknownKeys,
};
use crate::value::Value;

use super::{AsyncSchema, ValidateAsync};

struct AsyncObject {
    fields: IndexMap<String, AsyncSchema>,
    unknown: UnknownKeys<AsyncSchema>,
}

impl ValidateAsync for AsyncObject {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let object = expect_object(input)?;
            let mut output = initial_output(&self.unknown, object);

            for (key, schema) in &self.fields {
                let parsed = schema
                    .parse(input.get(key))
                    .await
                    .map_err(|e| e.at_key(key.as_str()))?;
                insert_field(&mut output, object, key, parsed);
            }

            if let UnknownKeys::Rest(rest) = &self.unknown {
                for (key, value) in object {
                    if self.fields.contains_key(key) {
                        continue;
                    }
                    let parsed = rest
                        .parse(value)
                        .await
                        .map_err(|e| e.at_key(key.as_str()))?;
                    output.insert(key.clone(), parsed);
                }
            }

            Ok(Value::Object(output))
        }
        .boxed()
    }
}

struct AsyncRecord {
    key: AsyncSchema,
    value: AsyncSchema,
}

impl ValidateAsync for AsyncRecord {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let object = expect_object(input)?;
            let mut output = IndexMap::with_capacity(object.len());
            for (key, value) in object {
                let parsed_key = self
                    .key
                    .parse(&Value::String(key.clone()))
                    .await
                    .map_err(|e| invalid_key(e, key))?;
                let parsed_value = self
                    .value
                    .parse(value)
                    .await
                    .map_err(|e| e.at_key(key.as_str()))?;
                output.insert(record_key(&parsed_key), parsed_value);
            }
            Ok(Value::Object(output))
        }
        .boxed()
    }
}

struct AsyncPartial {
    inner: AsyncSchema,
}

impl ValidateAsync for AsyncPartial {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let object = expect_object(input)?;
            match self.inner.parse(input).await {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Ok(Value::Object(object.clone())),
            }
        }
        .boxed()
    }
}

struct AsyncRequired {
    inner: AsyncSchema,
}

impl ValidateAsync for AsyncRequired {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let parsed = self.inner.parse(input).await;
            settle_required(input, parsed)
        }
        .boxed()
    }
}

fn object(fields: IndexMap<String, AsyncSchema>, unknown: UnknownKeys<AsyncSchema>) -> AsyncSchema {
    let metadata = object_metadata(&fields, &unknown);
    AsyncSchema::build(AsyncObject { fields, unknown }, metadata)
}

fn collect_fields<K, S, I>(fields: I) -> IndexMap<String, AsyncSchema>
where
    K: Into<String>,
    S: Into<AsyncSchema>,
    I: IntoIterator<Item = (K, S)>,
{
    fields
        .into_iter()
        .map(|(k, s)| (k.into(), s.into()))
        .collect()
}

impl AsyncSchema {
    /// Async [`Schema::object`](crate::Schema::object). Fields are awaited
    /// in declaration order.
    pub fn object<K, S, I>(fields: I) -> AsyncSchema
    where
        K: Into<String>,
        S: Into<AsyncSchema>,
        I: IntoIterator<Item = (K, S)>,
    {
        object(collect_fields(fields), UnknownKeys::Strip)
    }

    pub fn loose_object<K, S, I>(fields: I) -> AsyncSchema
    where
        K: Into<String>,
        S: Into<AsyncSchema>,
        I: IntoIterator<Item = (K, S)>,
    {
        object(collect_fields(fields), UnknownKeys::Passthrough)
    }

    pub fn object_with_rest<K, S, I>(fields: I, rest: impl Into<AsyncSchema>) -> AsyncSchema
    where
        K: Into<String>,
        S: Into<AsyncSchema>,
        I: IntoIterator<Item = (K, S)>,
    {
        object(collect_fields(fields), UnknownKeys::Rest(rest.into()))
    }

    /// Async [`Schema::record`](crate::Schema::record).
    pub fn record(key: impl Into<AsyncSchema>, value: impl Into<AsyncSchema>) -> AsyncSchema {
        let (key, value) = (key.into(), value.into());
        let metadata = Metadata::new("record").with_inner(Inner::Entry {
            key: Box::new(SchemaRef::from(&key)),
            value: Box::new(SchemaRef::from(&value)),
        });
        AsyncSchema::build(AsyncRecord { key, value }, metadata)
    }

    /// Async [`Schema::partial`](crate::Schema::partial).
    pub fn partial(object: impl Into<AsyncSchema>) -> AsyncSchema {
        let inner = object.into();
        let metadata = Metadata::wrap("partial", &inner, None);
        AsyncSchema::build(AsyncPartial { inner }, metadata)
    }

    /// Async [`Schema::required`](crate::Schema::required).
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{AsyncSchema, Schema, Value};
    /// use futures::executor::block_on;
    /// use indexmap::IndexMap;
    ///
    /// let schema = AsyncSchema::required(Schema::partial(Schema::object([
    ///     ("name", Schema::string()),
    /// ])));
    ///
    /// let mut fields = IndexMap::new();
    /// fields.insert("name".to_string(), Value::Undefined);
    ///
    /// let err = block_on(schema.parse(&Value::Object(fields))).unwrap_err();
    /// assert_eq!(err.message(), "name: Required");
    /// ```
    pub fn required(object: impl Into<AsyncSchema>) -> AsyncSchema {
        let inner = object.into();
        let metadata = Metadata::wrap("required", &inner, None);
        AsyncSchema::build(AsyncRequired { inner }, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[tokio::test]
    async fn test_async_object_matches_sync() {
        let fields = || [("name", Schema::string()), ("age", Schema::number())];
        let sync = Schema::object(fields());
        let asynchronous = AsyncSchema::object(fields());

        for input in [
            json!({"name": "A", "age": 1, "x": 2}),
            json!({"name": 1}),
            json!(null),
        ] {
            let input = v(input);
            assert_eq!(asynchronous.safe(&input).await, sync.safe(&input));
        }
    }

    #[tokio::test]
    async fn test_async_loose_and_rest_objects() {
        let loose = AsyncSchema::loose_object([("a", Schema::number())]);
        assert_eq!(
            loose.parse(&v(json!({"a": 1, "b": true}))).await.unwrap(),
            v(json!({"a": 1, "b": true}))
        );

        let rest = AsyncSchema::object_with_rest([("a", Schema::number())], Schema::boolean());
        assert_eq!(
            rest.parse(&v(json!({"a": 1, "b": "no"})))
                .await
                .unwrap_err()
                .message(),
            "b: Expected boolean"
        );
    }

    #[tokio::test]
    async fn test_async_record() {
        let schema = AsyncSchema::record(Schema::string(), Schema::number());
        assert_eq!(
            schema
                .parse(&v(json!({"a": "bad"})))
                .await
                .unwrap_err()
                .message(),
            "a: Expected number"
        );
    }

    #[tokio::test]
    async fn test_async_required_scenario() {
        let schema = AsyncSchema::required(AsyncSchema::partial(Schema::object([(
            "name",
            Schema::string(),
        )])));
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), Value::Undefined);

        let err = schema.parse(&Value::Object(fields)).await.unwrap_err();
        assert_eq!(err.message(), "name: Required");
        assert_eq!(err.issues().first().path.to_string(), "name");
    }

    #[tokio::test]
    async fn test_async_required_checks_inner_output() {
        let filled = AsyncSchema::required(AsyncSchema::object([(
            "name",
            AsyncSchema::from(Schema::string()).fallback("anon"),
        )]));
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), Value::Undefined);
        assert_eq!(
            filled.parse(&Value::Object(fields)).await.unwrap(),
            v(json!({"name": "anon"}))
        );

        let strict = AsyncSchema::required(Schema::object([("name", Schema::string())]));
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), Value::from("a"));
        fields.insert("extra".to_string(), Value::Undefined);
        assert_eq!(
            strict.parse(&Value::Object(fields)).await.unwrap(),
            v(json!({"name": "a"}))
        );
    }
}
