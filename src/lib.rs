//! # Assay
//!
//! Composable runtime validation for untyped values.
//!
//! ## Overview
//!
//! Small validators (leaf type checks, refinements, transforms) compose into
//! larger ones through combinators (objects, arrays, tuples, records, maps,
//! sets, unions), modifiers (optional, nullable, fallback) and pipes. Every
//! validator, however it was built, answers in three equivalent modes:
//!
//! - throwing: [`Schema::parse`] returns `Result<Value, ValidationError>`
//! - safe: [`Schema::safe`] returns a [`SafeResult`] carrying one message
//! - standard: `schema.standard().validate(..)` returns a [`StandardResult`]
//!   whose issues carry structured paths
//!
//! Validators never mutate their input; every output is a fresh value.
//!
//! ## Core Types
//!
//! - [`Value`]: the dynamic input and output model
//! - [`Schema`]: a shareable validator handle with attached [`Metadata`]
//! - [`AsyncSchema`]: the asynchronous mirror of [`Schema`]
//! - [`ValidationError`]: the flat message plus [`Issues`] located by [`JsonPath`]
//!
//! ## Example
//!
//! ```rust
//! use assay::{Schema, Value};
//! use serde_json::json;
//!
//! let user = Schema::object([
//!     ("name", Schema::pipe([Schema::string(), Schema::min_length(1)])),
//!     ("tags", Schema::array(Schema::string())),
//!     ("nickname", Schema::string().optional()),
//! ]);
//!
//! let input = Value::from(json!({"name": "Ada", "tags": ["admin", 7]}));
//!
//! let err = user.parse(&input).unwrap_err();
//! assert_eq!(err.message(), "tags: [1]: Expected string");
//! assert_eq!(err.issues().first().path.to_string(), "tags[1]");
//!
//! assert!(user.safe(&input).is_failure());
//! assert!(user.standard().validate(&input).is_failure());
//! ```

pub mod asynchronous;
pub mod error;
pub mod metadata;
pub mod outcome;
pub mod path;
pub mod schema;
pub mod value;

pub use asynchronous::{AsyncPipeStep, AsyncSchema, AsyncStandard, ValidateAsync};
pub use error::{Issue, Issues, ValidationError, UNKNOWN_ERROR};
pub use metadata::{Constraints, Inner, Metadata, MetadataUpdate, SchemaRef};
pub use outcome::{
    parse, safe_parse, SafeParse, SafeResult, StandardResult, STANDARD_VERSION, VENDOR,
};
pub use path::{JsonPath, PathSegment};
pub use schema::{
    Fallback, IssueCollector, MapFn, PipeStep, Schema, Standard, Validate, INVALID_INPUT,
};
pub use value::Value;
