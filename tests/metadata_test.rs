//! Tests for metadata attached by constructors, pipes and wrappers.

use assay::{Inner, Metadata, MetadataUpdate, Schema, Value};

#[test]
fn test_primitive_kinds() {
    assert_eq!(Schema::string().kind().as_deref(), Some("string"));
    assert_eq!(Schema::number().kind().as_deref(), Some("number"));
    assert_eq!(Schema::boolean().kind().as_deref(), Some("boolean"));
}

#[test]
fn test_pipe_merges_constraints_into_first_step() {
    let schema = Schema::pipe([Schema::string(), Schema::min_length(3), Schema::max_length(8)]);
    let metadata = schema.metadata().unwrap();

    assert_eq!(metadata.kind, "string");
    assert_eq!(metadata.constraints["minLength"], 3);
    assert_eq!(metadata.constraints["maxLength"], 8);
}

#[test]
fn test_wrappers_expose_inner_and_keep_description() {
    let name = Schema::string().describe("Display name");
    let optional = name.clone().optional();
    let metadata = optional.metadata().unwrap();

    assert_eq!(metadata.kind, "optional");
    assert_eq!(metadata.description.as_deref(), Some("Display name"));
    match metadata.inner {
        Some(Inner::One(inner)) => assert_eq!(inner.kind().as_deref(), Some("string")),
        other => panic!("expected one inner schema, got {:?}", other),
    }
}

#[test]
fn test_object_metadata_lists_fields_in_order() {
    let schema = Schema::object([("b", Schema::number()), ("a", Schema::string())]);
    let metadata = schema.metadata().unwrap();

    assert_eq!(metadata.kind, "object");
    match metadata.inner {
        Some(Inner::Shape { fields, rest }) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["b", "a"]);
            assert!(rest.is_none());
        }
        other => panic!("expected shape, got {:?}", other),
    }
}

#[test]
fn test_fallback_records_default() {
    let schema = Schema::number().fallback(0);
    let metadata = schema.metadata().unwrap();
    assert_eq!(metadata.kind, "fallback");
    assert_eq!(metadata.default, Some(serde_json::json!(0)));
}

#[test]
fn test_set_metadata_is_shared_by_clones() {
    let schema = Schema::string();
    let copy = schema.clone();
    schema.set_metadata(Metadata::new("email").with_constraint("format", "email"));

    let metadata = copy.metadata().unwrap();
    assert_eq!(metadata.kind, "email");
    assert_eq!(metadata.constraints["format"], "email");
}

#[test]
fn test_update_metadata_merges_fields() {
    let schema = Schema::number();
    assert!(schema.update_metadata(MetadataUpdate::title("Age")));
    assert!(schema.update_metadata(MetadataUpdate::description("Years")));

    let metadata = schema.metadata().unwrap();
    assert_eq!(metadata.kind, "number");
    assert_eq!(metadata.title.as_deref(), Some("Age"));
    assert_eq!(metadata.description.as_deref(), Some("Years"));
}

#[test]
fn test_metadata_does_not_affect_validation() {
    let schema = Schema::string();
    schema.set_metadata(Metadata::new("anything"));
    assert!(schema.parse(&Value::from("ok")).is_ok());
    assert!(schema.parse(&Value::from(1)).is_err());
}

#[test]
fn test_error_override_keeps_metadata() {
    let schema = Schema::string().describe("Label").error("bad label");
    let metadata = schema.metadata().unwrap();
    assert_eq!(metadata.kind, "error");
    assert_eq!(metadata.description.as_deref(), Some("Label"));
    match metadata.inner {
        Some(Inner::One(inner)) => assert_eq!(inner.kind().as_deref(), Some("string")),
        other => panic!("expected one inner schema, got {:?}", other),
    }
}

#[test]
fn test_error_override_sees_later_inner_updates() {
    let base = Schema::string();
    let schema = base.clone().error("bad label");
    assert!(base.update_metadata(MetadataUpdate::title("Label")));

    match schema.metadata().unwrap().inner {
        Some(Inner::One(inner)) => {
            assert_eq!(inner.metadata().unwrap().title.as_deref(), Some("Label"))
        }
        other => panic!("expected one inner schema, got {:?}", other),
    }
}
