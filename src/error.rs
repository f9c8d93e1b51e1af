use std::fmt;

use serde_json::Value;

use crate::fetch::FetchError;

/// A segment in a failure path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum PathSegment {
    /// Declared field name.
    Field(String),
    /// Key of a map field's input object.
    Key(String),
    /// Element index of an object-array field.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{}", name),
            PathSegment::Key(key) => write!(f, "[{:?}]", key),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Render a path as `.person.name.last` / `.emails["a@b.c"].rawValue` / `.arr[0].a`.
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter().map(|p| p.to_string()).collect()
}

/// The offending value carried by a type or shape failure.
///
/// This is the value *after* delimiter splitting and parsing, so a parser
/// that could not produce a number shows up as [`BadValue::NotANumber`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum BadValue {
    Value(Value),
    /// A parser rejected the raw string.
    NotANumber,
}

impl BadValue {
    /// The JSON value, if the parser produced one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            BadValue::Value(v) => Some(v),
            BadValue::NotANumber => None,
        }
    }
}

impl From<Value> for BadValue {
    fn from(value: Value) -> Self {
        BadValue::Value(value)
    }
}

impl From<Option<Value>> for BadValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(BadValue::NotANumber, BadValue::Value)
    }
}

impl fmt::Display for BadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadValue::Value(v) => f.write_str(&format_bad_value(v)),
            BadValue::NotANumber => f.write_str("NaN"),
        }
    }
}

/// Format a value the way it reads in a message: strings bare, arrays
/// comma-joined, objects as JSON.
pub fn format_bad_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(format_bad_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn wrong_type_message(bad_value: &BadValue, index: &Option<usize>) -> String {
    match index {
        Some(_) => format!("The value {} is of the wrong type", bad_value),
        None => format!("{} is the wrong type", bad_value),
    }
}

/// Why a single field failed.
#[derive(Debug, Clone, thiserror::Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serialize", serde(tag = "code", content = "detail", rename_all = "snake_case"))]
pub enum FieldError {
    #[error("A value is required")]
    RequiredMissing,

    #[error("The value can not be null")]
    NullNotAllowed,

    /// `index` is set when the value was one element of a sequence.
    #[error("{}", wrong_type_message(.bad_value, .index))]
    WrongType {
        bad_value: BadValue,
        index: Option<usize>,
    },

    #[error("Expected {bad_value} to be an array")]
    ExpectedArray { bad_value: BadValue },

    /// A container or map field received something other than an object.
    #[error("Expected {bad_value} to be an object")]
    ExpectedObject { bad_value: BadValue },

    #[error("Not all requested records were found. Expected {expected} but got {actual}")]
    NotFound { expected: usize, actual: usize },

    #[error("Record lookup failed: {0}")]
    FetchFailed(#[source] FetchError),

    #[error("Field is not present in specification")]
    UnknownField,

    /// One or more elements of an object-array field failed.
    #[error("{0}")]
    NestedValidation(ElementErrors),

    /// A container field's sub-object failed.
    #[error("{0}")]
    ObjectValidation(ObjectError),

    /// One or more keys of a map field failed.
    #[error("{0}")]
    MapValidation(MapError),
}

impl FieldError {
    /// Stable string key for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::RequiredMissing => "required_missing",
            FieldError::NullNotAllowed => "null_not_allowed",
            FieldError::WrongType { .. } => "wrong_type",
            FieldError::ExpectedArray { .. } => "expected_array",
            FieldError::ExpectedObject { .. } => "expected_object",
            FieldError::NotFound { .. } => "not_found",
            FieldError::FetchFailed(_) => "fetch_failed",
            FieldError::UnknownField => "unknown_field",
            FieldError::NestedValidation(_) => "nested_validation",
            FieldError::ObjectValidation(_) => "object_validation",
            FieldError::MapValidation(_) => "map_validation",
        }
    }

    /// The offending value, for failures that carry one.
    pub fn bad_value(&self) -> Option<&BadValue> {
        match self {
            FieldError::WrongType { bad_value, .. }
            | FieldError::ExpectedArray { bad_value }
            | FieldError::ExpectedObject { bad_value } => Some(bad_value),
            _ => None,
        }
    }

    /// Whether this failure wraps a subtree rather than describing a leaf.
    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            FieldError::NestedValidation(_)
                | FieldError::ObjectValidation(_)
                | FieldError::MapValidation(_)
        )
    }

    fn collect_leaves<'a>(&'a self, path: Vec<PathSegment>, out: &mut Vec<LeafFailure<'a>>) {
        match self {
            FieldError::ObjectValidation(inner) => inner.collect_leaves(&path, out),
            FieldError::MapValidation(map) => {
                for entry in &map.keys {
                    let mut p = path.clone();
                    p.push(PathSegment::Key(entry.key.clone()));
                    entry.error.collect_leaves(&p, out);
                }
            }
            FieldError::NestedValidation(elements) => {
                for element in &elements.elements {
                    let mut p = path.clone();
                    p.push(PathSegment::Index(element.index));
                    element.error.collect_leaves(p, out);
                }
            }
            _ => out.push(LeafFailure { path, error: self }),
        }
    }
}

/// A failure tagged with the field that produced it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FieldFailure {
    pub field: String,
    pub error: FieldError,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error validating {}: {}", self.field, self.error)
    }
}

impl std::error::Error for FieldFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Aggregate error for one object: every failing field, in spec order.
///
/// Renders as `first of N error(s): Error validating <field>: <reason>`,
/// so the path to the first failure can be read off the message alone.
/// Use [`errors()`](Self::errors) or [`leaves()`](Self::leaves) to inspect
/// all of them.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ObjectError {
    failures: Vec<FieldFailure>,
}

impl ObjectError {
    pub fn new() -> Self {
        Self { failures: vec![] }
    }

    /// Create an error with a single failing field.
    pub fn single(field: impl Into<String>, error: FieldError) -> Self {
        let mut err = Self::new();
        err.push(field, error);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, error: FieldError) {
        self.failures.push(FieldFailure {
            field: field.into(),
            error,
        });
    }

    /// Every failing field, in spec order.
    pub fn errors(&self) -> &[FieldFailure] {
        &self.failures
    }

    /// The failure recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.failures
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.error)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether validation was aborted because of an undeclared input key.
    pub fn is_unknown_field(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(f.error, FieldError::UnknownField))
    }

    /// Walk the tree and return every leaf failure with its full path.
    pub fn leaves(&self) -> Vec<LeafFailure<'_>> {
        let mut out = Vec::new();
        self.collect_leaves(&[], &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &[PathSegment], out: &mut Vec<LeafFailure<'a>>) {
        for failure in &self.failures {
            let mut path = prefix.to_vec();
            path.push(PathSegment::Field(failure.field.clone()));
            failure.error.collect_leaves(path, out);
        }
    }
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.first() {
            Some(first) => {
                let n = self.failures.len();
                write!(
                    f,
                    "first of {} error{}: {}",
                    n,
                    if n == 1 { "" } else { "s" },
                    first
                )
            }
            None => f.write_str("Validation failed for fields"),
        }
    }
}

impl std::error::Error for ObjectError {}

/// Failure of one key of a map field.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct KeyFailure {
    pub key: String,
    pub error: ObjectError,
}

/// Every failing key of a map field.
///
/// All keys are validated; the message shows the first failing key.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct MapError {
    keys: Vec<KeyFailure>,
}

impl MapError {
    pub fn new() -> Self {
        Self { keys: vec![] }
    }

    pub fn push(&mut self, key: impl Into<String>, error: ObjectError) {
        self.keys.push(KeyFailure {
            key: key.into(),
            error,
        });
    }

    pub fn keys(&self) -> &[KeyFailure] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&ObjectError> {
        self.keys.iter().find(|k| k.key == key).map(|k| &k.error)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keys.first() {
            Some(first) => write!(f, "{}", first.error),
            None => f.write_str("Validation failed for values"),
        }
    }
}

/// Failure of one element of an object-array field.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ElementFailure {
    pub index: usize,
    pub error: FieldError,
}

/// Every failing element of an object-array field.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ElementErrors {
    elements: Vec<ElementFailure>,
}

impl ElementErrors {
    pub fn new() -> Self {
        Self { elements: vec![] }
    }

    pub fn push(&mut self, index: usize, error: FieldError) {
        self.elements.push(ElementFailure { index, error });
    }

    pub fn elements(&self) -> &[ElementFailure] {
        &self.elements
    }

    pub fn get(&self, index: usize) -> Option<&FieldError> {
        self.elements
            .iter()
            .find(|e| e.index == index)
            .map(|e| &e.error)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for ElementErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.elements.first() {
            Some(first) => write!(f, "{}", first.error),
            None => f.write_str("Validation failed for elements"),
        }
    }
}

/// A leaf failure located by its full path from the validated root.
#[derive(Debug, Clone)]
pub struct LeafFailure<'a> {
    pub path: Vec<PathSegment>,
    pub error: &'a FieldError,
}

impl LeafFailure<'_> {
    /// Dotted path without the leading dot, e.g. `person.name.last`.
    pub fn path_string(&self) -> String {
        let path = format_path(&self.path);
        path.strip_prefix('.').map(str::to_string).unwrap_or(path)
    }
}

impl fmt::Display for LeafFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.error)
    }
}
