//! # scrub: declarative request-object validation
//!
//! `scrub` validates JSON objects against a nested field specification. It
//! checks presence, nullability and type, optionally splits and parses raw
//! strings, optionally resolves keys against an external record store, and
//! returns the parsed object together with an error tree that mirrors the
//! spec.
//!
//! ## Quick Start
//!
//! ```rust
//! use scrub::prelude::*;
//! use serde_json::json;
//!
//! let spec = scrub::object()
//!     .field("title", scrub::field(types::string()).required().not_null())
//!     .field(
//!         "ids",
//!         scrub::field(types::number())
//!             .delimiter(",")
//!             .parser(parsers::string_to_int()),
//!     );
//!
//! let outcome = spec.validate(r#"{"title": "Report", "ids": "1,2,3"}"#).unwrap();
//! assert!(outcome.is_valid());
//! assert_eq!(outcome.get("ids"), Some(&json!([1, 2, 3])));
//!
//! let outcome = spec.validate(r#"{"ids": "abc"}"#).unwrap();
//! let err = outcome.error.unwrap();
//! assert_eq!(err.errors()[0].to_string(), "Error validating title: A value is required");
//! assert_eq!(
//!     err.errors()[1].to_string(),
//!     "Error validating ids: The value NaN is of the wrong type"
//! );
//! ```

pub mod error;
pub mod fetch;
pub mod field;
pub mod format;
pub mod input;
pub mod map;
pub mod object;
pub mod parsers;
pub mod spec;
pub mod types;

pub use object::{validate_object, Outcome};
pub use spec::{FieldSpec, Spec};

// Re-export serde_json so callers can build inputs without a direct dependency
#[doc(hidden)]
pub use serde_json;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create an empty object specification.
pub fn object() -> spec::Spec {
    spec::Spec::new()
}

/// Create a leaf field checked against `type_check`.
pub fn field(type_check: types::Predicate) -> spec::Leaf {
    spec::Leaf::new(type_check)
}

/// Create a container field validated against a nested spec.
pub fn nested(spec: spec::Spec) -> spec::FieldSpec {
    spec::FieldSpec::nested(spec)
}

/// Create a map field: every value of the input object is validated against
/// `spec`.
///
/// ```
/// use scrub::prelude::*;
/// use serde_json::json;
///
/// let spec = scrub::object().field(
///     "flags",
///     scrub::values(scrub::object().field("rawValue", scrub::field(types::boolean()))),
/// );
/// let outcome = spec.validate_value(&json!({"flags": {"beta": true}})).unwrap();
/// assert_eq!(outcome.get("flags"), Some(&json!({"beta": true})));
/// ```
pub fn values(spec: spec::Spec) -> spec::FieldSpec {
    spec::FieldSpec::values(spec)
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Common imports for working with `scrub`.
pub mod prelude {
    pub use crate::error::{
        BadValue, ElementErrors, FieldError, FieldFailure, MapError, ObjectError, PathSegment,
    };
    pub use crate::fetch::{FetchError, FetchKey, FetchMethod, Fetched, MemoryModel, ModelFetch};
    pub use crate::field::{validate_field, FieldOutcome};
    pub use crate::format::{flatten_error, prettify_error, treeify_error};
    pub use crate::input::{InputError, ScrubInput};
    pub use crate::map::RAW_VALUE;
    pub use crate::object::{validate_object, Outcome};
    pub use crate::parsers::{self, Parser};
    pub use crate::spec::{FieldKind, FieldSpec, Leaf, Spec};
    pub use crate::types::{self, Predicate};
}
