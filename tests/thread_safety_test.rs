//! Tests for sharing validators across threads.

use assay::{Schema, Value};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn user_schema() -> Schema {
    Schema::object([
        ("name", Schema::pipe([Schema::string(), Schema::min_length(1)])),
        ("age", Schema::pipe([Schema::integer(), Schema::min_value(0.0)])),
    ])
}

#[test]
fn test_concurrent_validation() {
    let schema = Arc::new(user_schema());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let input = Value::from(json!({
                    "name": format!("User{}", i),
                    "age": 20 + i
                }));
                assert!(schema.parse(&input).is_ok());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_failures_are_independent() {
    let schema = user_schema();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let schema = schema.clone();
            thread::spawn(move || {
                let input = if i % 2 == 0 {
                    Value::from(json!({"name": "", "age": 1}))
                } else {
                    Value::from(json!({"name": "ok", "age": -1}))
                };
                let err = schema.parse(&input).unwrap_err();
                (i, err.message().to_string())
            })
        })
        .collect();

    for handle in handles {
        let (i, message) = handle.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(message, "name: Length must be at least 1, got 0");
        } else {
            assert_eq!(message, "age: Value must be at least 0, got -1");
        }
    }
}

#[test]
fn test_metadata_updates_visible_across_threads() {
    let schema = Schema::string();
    let writer = schema.clone();

    thread::spawn(move || {
        writer.describe("set from another thread");
    })
    .join()
    .unwrap();

    assert_eq!(
        schema.metadata().unwrap().description.as_deref(),
        Some("set from another thread")
    );
}
