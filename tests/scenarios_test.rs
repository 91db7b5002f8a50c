//! End-to-end behavior of the core combinators across all three modes.

use assay::{AsyncSchema, Schema, StandardResult, Value};
use indexmap::IndexMap;
use serde_json::json;
use stillwater::Validation;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn failure(message: &str) -> Validation<Value, String> {
    Validation::Failure(message.to_string())
}

#[test]
fn test_object_scenario() {
    let schema = Schema::object([("name", Schema::string()), ("age", Schema::number())]);

    assert_eq!(
        schema.parse(&v(json!({"name": "John", "age": 30}))).unwrap(),
        v(json!({"name": "John", "age": 30}))
    );

    let err = schema.parse(&v(json!({"name": 123}))).unwrap_err();
    assert_eq!(err.message(), "name: Expected string");
    assert_eq!(
        schema.safe(&v(json!({"name": 123}))),
        failure("name: Expected string")
    );
}

#[test]
fn test_tuple_scenario() {
    let schema = Schema::tuple([Schema::string(), Schema::number()]);
    assert_eq!(
        schema.parse(&v(json!(["hello", 42]))).unwrap(),
        v(json!(["hello", 42]))
    );
    assert_eq!(
        schema.parse(&v(json!(["hello"]))).unwrap_err().message(),
        "Expected 2 items, got 1"
    );
}

#[test]
fn test_array_scenario() {
    let schema = Schema::array(Schema::number());
    assert_eq!(
        schema.parse(&v(json!([1, "x", 3]))).unwrap_err().message(),
        "[1]: Expected number"
    );
}

#[test]
fn test_union_scenario() {
    let schema = Schema::union([Schema::string(), Schema::number()]);
    assert_eq!(
        schema.parse(&Value::from(true)).unwrap_err().message(),
        "No matching schema in union"
    );
    assert_eq!(schema.parse(&Value::from(42)).unwrap(), Value::from(42));
}

#[test]
fn test_record_scenario() {
    let schema = Schema::record(Schema::string(), Schema::number());
    let err = schema.parse(&v(json!({"a": "bad"}))).unwrap_err();
    assert!(err.message().contains("a: Expected number"));
}

#[tokio::test]
async fn test_required_async_scenario() {
    let object = AsyncSchema::object([("name", Schema::string())]);
    let schema = AsyncSchema::required(object);

    let mut fields = IndexMap::new();
    fields.insert("name".to_string(), Value::Undefined);
    let input = Value::Object(fields);

    assert_eq!(
        schema.parse(&input).await.unwrap_err().message(),
        "name: Required"
    );
    assert_eq!(schema.safe(&input).await, failure("name: Required"));
}

#[test]
fn test_nested_paths_in_standard_mode() {
    let schema = Schema::object([(
        "users",
        Schema::array(Schema::object([("email", Schema::string())])),
    )]);
    let input = v(json!({"users": [{"email": "a@b.c"}, {"email": 5}]}));

    let err = schema.parse(&input).unwrap_err();
    assert_eq!(err.message(), "users: [1]: email: Expected string");

    match schema.standard().validate(&input) {
        StandardResult::Failure { issues } => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].message, "Expected string");
            assert_eq!(issues[0].path.to_string(), "users[1].email");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_output_is_distinct_from_input() {
    let schema = Schema::array(Schema::number());
    let input = v(json!([1, 2, 3]));
    let mut output = schema.parse(&input).unwrap();
    assert_eq!(output, input);

    if let Value::Array(items) = &mut output {
        items.push(Value::from(4));
    }
    assert_eq!(input, v(json!([1, 2, 3])));
}

#[test]
fn test_recursive_schema_with_lazy() {
    fn comment() -> Schema {
        Schema::object([
            ("text", Schema::string()),
            ("replies", Schema::array(Schema::lazy(comment)).optional()),
        ])
    }

    let valid = v(json!({
        "text": "Top comment",
        "replies": [
            {"text": "Reply 1"},
            {"text": "Reply 2", "replies": [{"text": "Nested reply"}]}
        ]
    }));
    assert_eq!(comment().parse(&valid).unwrap(), valid);

    let invalid = v(json!({
        "text": "Top comment",
        "replies": [{"text": "Reply", "replies": [{"text": 7}]}]
    }));
    let err = comment().parse(&invalid).unwrap_err();
    assert_eq!(err.message(), "replies: [0]: replies: [0]: text: Expected string");
    assert_eq!(
        err.issues().first().path.to_string(),
        "replies[0].replies[0].text"
    );
}
