//! Map fields: open-ended objects whose every value follows one sub-spec.
//!
//! A value may be a record (an object, validated against the whole sub-spec)
//! or a scalar. A scalar is validated as if it were the only field of a
//! record, declared under [`RAW_VALUE`]; every other declared field sees it
//! as absent. The parsed output keeps the scalar shape.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{FieldError, MapError, ObjectError};
use crate::field::{validate_field, FieldOutcome};
use crate::object::validate_object;
use crate::spec::Spec;

/// Name of the sub-spec field that describes scalar map values.
pub const RAW_VALUE: &str = "rawValue";

enum Entry<'a> {
    Record(&'a Map<String, Value>),
    Scalar(&'a Value),
}

impl<'a> Entry<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(obj) => Entry::Record(obj),
            other => Entry::Scalar(other),
        }
    }
}

/// Validate every key of `obj` against `values`.
///
/// All keys are validated. A failing key contributes nothing to the parsed
/// map; passing keys are kept even when others fail.
pub(crate) fn validate_map(obj: &Map<String, Value>, values: &Spec) -> FieldOutcome {
    let mut parsed = Map::new();
    let mut errors = MapError::new();

    for (key, value) in obj {
        trace!(key = %key, "validating map value");
        let result = match Entry::of(value) {
            Entry::Record(record) => {
                let outcome = validate_object(record, values);
                match outcome.error {
                    Some(e) => Err(e),
                    None => Ok(outcome.parsed.map(Value::Object)),
                }
            }
            Entry::Scalar(scalar) => validate_scalar(scalar, values),
        };
        match result {
            Ok(Some(v)) => {
                parsed.insert(key.clone(), v);
            }
            Ok(None) => {}
            Err(e) => errors.push(key.clone(), e),
        }
    }

    FieldOutcome {
        parsed: Some(Value::Object(parsed)),
        error: if errors.is_empty() {
            None
        } else {
            Some(FieldError::MapValidation(errors))
        },
    }
}

fn validate_scalar(value: &Value, values: &Spec) -> Result<Option<Value>, ObjectError> {
    if values.fails_on_unknown_fields() && values.get(RAW_VALUE).is_none() {
        return Err(ObjectError::single(RAW_VALUE, FieldError::UnknownField));
    }

    let mut raw = None;
    let mut errors = ObjectError::new();
    for (name, field) in values.fields() {
        let input = if name == RAW_VALUE { Some(value) } else { None };
        let outcome = validate_field(input, field);
        if let Some(e) = outcome.error {
            errors.push(name, e);
        }
        if name == RAW_VALUE {
            raw = outcome.parsed;
        }
    }

    if errors.is_empty() {
        Ok(raw)
    } else {
        Err(errors)
    }
}
