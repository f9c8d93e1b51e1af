use std::collections::HashMap;

use crate::error::{format_path, ObjectError, PathSegment};

/// Flat error structure, useful for form validation.
///
/// `field_errors` groups leaf messages by top-level field name.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FlatError {
    pub field_errors: HashMap<String, Vec<String>>,
}

/// Flatten an [`ObjectError`] into messages per top-level field.
///
/// # Example
/// ```
/// use scrub::error::{FieldError, ObjectError};
/// use scrub::format::flatten_error;
///
/// let err = ObjectError::single("email", FieldError::RequiredMissing);
/// let flat = flatten_error(&err);
/// assert_eq!(flat.field_errors["email"], vec!["A value is required"]);
/// ```
pub fn flatten_error(error: &ObjectError) -> FlatError {
    let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();

    for leaf in error.leaves() {
        let key = match leaf.path.first() {
            Some(PathSegment::Field(name)) | Some(PathSegment::Key(name)) => name.clone(),
            Some(PathSegment::Index(idx)) => idx.to_string(),
            None => continue,
        };
        field_errors
            .entry(key)
            .or_default()
            .push(leaf.error.to_string());
    }

    FlatError { field_errors }
}

/// Tree-based error structure, mirrors the spec shape.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ErrorTree {
    pub errors: Vec<String>,
    pub properties: HashMap<String, ErrorTree>,
    pub items: Vec<Option<ErrorTree>>,
}

/// Convert an [`ObjectError`] into a tree of leaf messages.
///
/// Declared fields and map keys both become `properties`; object-array
/// elements become `items`.
pub fn treeify_error(error: &ObjectError) -> ErrorTree {
    let mut root = ErrorTree::default();

    for leaf in error.leaves() {
        let mut current = &mut root;
        for segment in &leaf.path {
            current = match segment {
                PathSegment::Field(name) | PathSegment::Key(name) => {
                    current.properties.entry(name.clone()).or_default()
                }
                PathSegment::Index(idx) => {
                    while current.items.len() <= *idx {
                        current.items.push(None);
                    }
                    current.items[*idx].get_or_insert_with(ErrorTree::default)
                }
            };
        }
        current.errors.push(leaf.error.to_string());
    }

    root
}

/// Format an [`ObjectError`] into a human-readable string, one entry per
/// leaf failure.
///
/// # Example output
/// ```text
/// ✖ A value is required
///   → at .person.name.last
/// ✖ asdf is the wrong type
///   → at .emails["test@test.com"].rawValue, received asdf
/// ```
pub fn prettify_error(error: &ObjectError) -> String {
    let mut lines = Vec::new();

    for leaf in error.leaves() {
        lines.push(format!("✖ {}", leaf.error));
        let mut parts = vec![format!("at {}", format_path(&leaf.path))];
        if let Some(bad) = leaf.error.bad_value() {
            parts.push(format!("received {}", bad));
        }
        lines.push(format!("  → {}", parts.join(", ")));
    }

    lines.join("\n")
}
