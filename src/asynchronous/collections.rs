//! Async arrays, tuples, maps and sets.

use futures::future::{BoxFuture, FutureExt};

use crate::error::ValidationError;
use crate::metadata::Metadata;
use crate::schema::array::{check_tuple_len, expect_array, tuple_metadata, TupleRest};
use crate::schema::collections::{
    expect_map, expect_set, map_key_error, map_metadata, map_value_error, set_item_error,
};
use crate::value::{insert_entry, insert_unique, Value};

use super::{AsyncSchema, ValidateAsync};

struct AsyncArray {
    item: AsyncSchema,
}

impl ValidateAsync for AsyncArray {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let items = expect_array(input)?;
            let mut output = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                output.push(self.item.parse(item).await.map_err(|e| e.at_index(index))?);
            }
            Ok(Value::Array(output))
        }
        .boxed()
    }
}

struct AsyncTuple {
    items: Vec<AsyncSchema>,
    rest: TupleRest<AsyncSchema>,
}

impl ValidateAsync for AsyncTuple {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let values = expect_array(input)?;
            check_tuple_len(&self.rest, self.items.len(), values.len())?;

            let mut output = Vec::with_capacity(values.len());
            for (index, (schema, value)) in self.items.iter().zip(values).enumerate() {
                output.push(schema.parse(value).await.map_err(|e| e.at_index(index))?);
            }
            if let TupleRest::Rest(rest) = &self.rest {
                for (index, value) in values.iter().enumerate().skip(self.items.len()) {
                    output.push(rest.parse(value).await.map_err(|e| e.at_index(index))?);
                }
            }
            Ok(Value::Array(output))
        }
        .boxed()
    }
}

struct AsyncMap {
    key: AsyncSchema,
    value: AsyncSchema,
}

impl ValidateAsync for AsyncMap {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let entries = expect_map(input)?;
            let mut output = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let parsed_key = self
                    .key
                    .parse(key)
                    .await
                    .map_err(|e| map_key_error(e, key))?;
                let parsed_value = self
                    .value
                    .parse(value)
                    .await
                    .map_err(|e| map_value_error(e, key))?;
                insert_entry(&mut output, parsed_key, parsed_value);
            }
            Ok(Value::Map(output))
        }
        .boxed()
    }
}

struct AsyncSet {
    item: AsyncSchema,
}

impl ValidateAsync for AsyncSet {
    fn validate<'a>(&'a self, input: &'a Value) -> BoxFuture<'a, Result<Value, ValidationError>> {
        async move {
            let items = expect_set(input)?;
            let mut output = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let parsed = self
                    .item
                    .parse(item)
                    .await
                    .map_err(|e| set_item_error(e, index))?;
                insert_unique(&mut output, parsed);
            }
            Ok(Value::Set(output))
        }
        .boxed()
    }
}

fn tuple(items: Vec<AsyncSchema>, rest: TupleRest<AsyncSchema>) -> AsyncSchema {
    let metadata = tuple_metadata(&items, &rest);
    AsyncSchema::build(AsyncTuple { items, rest }, metadata)
}

fn collect<I>(items: I) -> Vec<AsyncSchema>
where
    I: IntoIterator,
    I::Item: Into<AsyncSchema>,
{
    items.into_iter().map(Into::into).collect()
}

impl AsyncSchema {
    /// Async [`Schema::array`](crate::Schema::array). Items are awaited in
    /// index order.
    pub fn array(item: impl Into<AsyncSchema>) -> AsyncSchema {
        let item = item.into();
        let metadata = Metadata::wrap("array", &item, None);
        AsyncSchema::build(AsyncArray { item }, metadata)
    }

    pub fn tuple<I>(items: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        tuple(collect(items), TupleRest::Exact)
    }

    pub fn loose_tuple<I>(items: I) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        tuple(collect(items), TupleRest::Loose)
    }

    pub fn tuple_with_rest<I>(items: I, rest: impl Into<AsyncSchema>) -> AsyncSchema
    where
        I: IntoIterator,
        I::Item: Into<AsyncSchema>,
    {
        tuple(collect(items), TupleRest::Rest(rest.into()))
    }

    /// Async [`Schema::map`](crate::Schema::map).
    pub fn map(key: impl Into<AsyncSchema>, value: impl Into<AsyncSchema>) -> AsyncSchema {
        let (key, value) = (key.into(), value.into());
        let metadata = map_metadata(&key, &value);
        AsyncSchema::build(AsyncMap { key, value }, metadata)
    }

    /// Async [`Schema::set`](crate::Schema::set).
    pub fn set(item: impl Into<AsyncSchema>) -> AsyncSchema {
        let item = item.into();
        let metadata = Metadata::wrap("set", &item, None);
        AsyncSchema::build(AsyncSet { item }, metadata)
    }
}
