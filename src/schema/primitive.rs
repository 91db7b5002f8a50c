//! Leaf validators.
//!
//! A leaf performs one runtime type check and fails with a fixed message.
//! Further refinement (length, range, pattern) is layered on with
//! [`Schema::pipe`].

use crate::error::ValidationError;
use crate::metadata::Metadata;
use crate::value::Value;

use super::traits::Validate;
use super::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Undefined,
    Any,
}

impl PrimitiveKind {
    fn tag(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Any => "any",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (PrimitiveKind::String, Value::String(_)) => true,
            (PrimitiveKind::Number, Value::Number(n)) => !n.is_nan(),
            (PrimitiveKind::Integer, Value::Number(n)) => n.is_finite() && n.fract() == 0.0,
            (PrimitiveKind::Boolean, Value::Bool(_)) => true,
            (PrimitiveKind::Null, Value::Null) => true,
            (PrimitiveKind::Undefined, Value::Undefined) => true,
            (PrimitiveKind::Any, _) => true,
            _ => false,
        }
    }
}

/// A single runtime type check.
struct PrimitiveSchema {
    kind: PrimitiveKind,
}

impl Validate for PrimitiveSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        if self.kind.accepts(input) {
            Ok(input.clone())
        } else {
            Err(ValidationError::invalid_type(format!(
                "Expected {}",
                self.kind.tag()
            )))
        }
    }
}

/// Accepts values equal to one of the listed values.
struct LiteralSchema {
    allowed: Vec<Value>,
    message: String,
}

impl Validate for LiteralSchema {
    fn validate(&self, input: &Value) -> Result<Value, ValidationError> {
        if self.allowed.contains(input) {
            Ok(input.clone())
        } else {
            Err(ValidationError::invalid_type(self.message.clone()))
        }
    }
}

fn primitive(kind: PrimitiveKind) -> Schema {
    Schema::build(PrimitiveSchema { kind }, Metadata::new(kind.tag()))
}

impl Schema {
    /// Accepts strings. Fails with `"Expected string"`.
    pub fn string() -> Schema {
        primitive(PrimitiveKind::String)
    }

    /// Accepts numbers other than NaN. Fails with `"Expected number"`.
    pub fn number() -> Schema {
        primitive(PrimitiveKind::Number)
    }

    /// Accepts finite whole numbers. Fails with `"Expected integer"`.
    pub fn integer() -> Schema {
        primitive(PrimitiveKind::Integer)
    }

    /// Accepts booleans. Fails with `"Expected boolean"`.
    pub fn boolean() -> Schema {
        primitive(PrimitiveKind::Boolean)
    }

    /// Accepts only `null`.
    pub fn null() -> Schema {
        primitive(PrimitiveKind::Null)
    }

    /// Accepts only `undefined`.
    pub fn undefined() -> Schema {
        primitive(PrimitiveKind::Undefined)
    }

    /// Accepts everything unchanged.
    pub fn any() -> Schema {
        primitive(PrimitiveKind::Any)
    }

    /// Accepts everything unchanged; an alias of [`Schema::any`] with its own
    /// type tag.
    pub fn unknown() -> Schema {
        Schema::build(PrimitiveSchema { kind: PrimitiveKind::Any }, Metadata::new("unknown"))
    }

    /// Accepts exactly `value`. Fails with `"Expected <value as JSON>"`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assay::{Schema, Value};
    ///
    /// let admin = Schema::literal("admin");
    /// assert!(admin.parse(&Value::from("admin")).is_ok());
    /// assert_eq!(
    ///     admin.parse(&Value::from("user")).unwrap_err().message(),
    ///     "Expected \"admin\""
    /// );
    /// ```
    pub fn literal(value: impl Into<Value>) -> Schema {
        let value = value.into();
        let message = format!("Expected {}", value.render());
        let metadata = Metadata::new("literal").with_constraint("const", value.to_json());
        Schema::build(
            LiteralSchema {
                allowed: vec![value],
                message,
            },
            metadata,
        )
    }

    /// Accepts any of `values`. Fails with `"Expected one of [..]"`.
    pub fn picklist<I, V>(values: I) -> Schema
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let allowed: Vec<Value> = values.into_iter().map(Into::into).collect();
        let rendered: Vec<String> = allowed.iter().map(Value::render).collect();
        let message = format!("Expected one of [{}]", rendered.join(", "));
        let options = serde_json::Value::Array(allowed.iter().map(Value::to_json).collect());
        Schema::build(
            LiteralSchema { allowed, message },
            Metadata::new("picklist").with_constraint("enum", options),
        )
    }
}
