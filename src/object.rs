use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{FieldError, ObjectError};
use crate::field::validate_field;
use crate::spec::Spec;

/// Result of validating an object: the parsed fields and, if anything
/// failed, the complete error tree.
///
/// Both can be present at once. Fields that passed are in `parsed` even
/// when siblings failed, and a container field whose children partly failed
/// appears in both.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Outcome {
    /// `None` only when validation was aborted on an undeclared key.
    pub parsed: Option<Map<String, Value>>,
    pub error: Option<ObjectError>,
}

impl Outcome {
    fn aborted(error: ObjectError) -> Self {
        Self {
            parsed: None,
            error: Some(error),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Whether validation stopped before any field was checked.
    pub fn is_aborted(&self) -> bool {
        self.parsed.is_none()
    }

    /// A parsed field, if it was produced.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.parsed.as_ref().and_then(|p| p.get(field))
    }

    /// The parsed fields as a JSON object.
    pub fn parsed_value(&self) -> Option<Value> {
        self.parsed.clone().map(Value::Object)
    }

    /// Drop partial results: `Ok` only if every field passed.
    pub fn into_result(self) -> Result<Map<String, Value>, ObjectError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.parsed.unwrap_or_default()),
        }
    }
}

/// Validate `obj` against `spec`.
///
/// Undeclared keys are dropped, or abort the whole call when the spec
/// fails on unknown fields. Declared fields are validated independently and
/// their failures collected in declaration order.
///
/// # Example
/// ```
/// use scrub::types;
/// use serde_json::json;
///
/// let spec = scrub::object().field(
///     "name",
///     scrub::nested(
///         scrub::object()
///             .field("first", scrub::field(types::string()).required().not_null())
///             .field("last", scrub::field(types::string()).required().not_null()),
///     ),
/// );
/// let input = json!({"name": {"first": "Dave", "last": null}});
/// let outcome = scrub::validate_object(input.as_object().unwrap(), &spec);
///
/// let err = outcome.error.unwrap();
/// assert_eq!(
///     err.errors()[0].to_string(),
///     "Error validating name: first of 1 error: Error validating last: The value can not be null"
/// );
/// ```
pub fn validate_object(obj: &Map<String, Value>, spec: &Spec) -> Outcome {
    debug!(fields = spec.len(), keys = obj.len(), "validating object");

    if spec.fails_on_unknown_fields() {
        if let Some(key) = obj.keys().find(|k| spec.get(k).is_none()) {
            debug!(field = %key, "rejecting undeclared field");
            return Outcome::aborted(ObjectError::single(key.clone(), FieldError::UnknownField));
        }
    }

    let mut parsed = Map::new();
    let mut errors = ObjectError::new();

    for (name, field) in spec.fields() {
        trace!(field = %name, "validating field");
        let outcome = validate_field(obj.get(name), field);
        if let Some(v) = outcome.parsed {
            parsed.insert(name.to_string(), v);
        }
        if let Some(e) = outcome.error {
            trace!(field = %name, code = e.code(), "field failed");
            errors.push(name, e);
        }
    }

    debug!(
        parsed = parsed.len(),
        failed = errors.len(),
        "object validated"
    );

    Outcome {
        parsed: Some(parsed),
        error: if errors.is_empty() { None } else { Some(errors) },
    }
}
