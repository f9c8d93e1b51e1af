//! Single-field validation.
//!
//! Presence and nullability are settled first for every kind of field, then
//! the field is dispatched by kind: leaf rules run here, containers recurse
//! into [`validate_object`], and map fields go through
//! [`validate_map`](crate::map::validate_map).

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{BadValue, ElementErrors, FieldError};
use crate::fetch::{FetchKey, FetchMethod, Fetched};
use crate::map::validate_map;
use crate::object::validate_object;
use crate::spec::{FetchRules, FieldKind, FieldSpec, LeafRules, Spec};

/// Result of validating one field.
///
/// A leaf field yields a value or an error, never both. Container and map
/// fields may yield both: the successfully validated part of the subtree
/// alongside the failures of the rest.
#[derive(Debug, Clone, Default)]
pub struct FieldOutcome {
    /// `None` when the field produced no value (absent and optional, or failed).
    pub parsed: Option<Value>,
    pub error: Option<FieldError>,
}

impl FieldOutcome {
    fn absent() -> Self {
        Self::default()
    }

    fn value(value: Value) -> Self {
        Self {
            parsed: Some(value),
            error: None,
        }
    }

    fn failed(error: FieldError) -> Self {
        Self {
            parsed: None,
            error: Some(error),
        }
    }

    fn from_result(result: Result<Value, FieldError>) -> Self {
        match result {
            Ok(v) => Self::value(v),
            Err(e) => Self::failed(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Leaf view of the outcome: the error wins over any partial value.
    pub fn into_result(self) -> Result<Option<Value>, FieldError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.parsed),
        }
    }
}

/// Validate one field value. `None` means the key was absent from the input.
///
/// # Example
/// ```
/// use scrub::{field::validate_field, parsers, types};
/// use serde_json::json;
///
/// let spec: scrub::FieldSpec = scrub::field(types::number())
///     .delimiter(",")
///     .parser(parsers::string_to_int())
///     .into();
/// let outcome = validate_field(Some(&json!("1,2,3")), &spec);
/// assert_eq!(outcome.parsed, Some(json!([1, 2, 3])));
/// ```
pub fn validate_field(value: Option<&Value>, field: &FieldSpec) -> FieldOutcome {
    let value = match value {
        None if field.required => return FieldOutcome::failed(FieldError::RequiredMissing),
        None => return FieldOutcome::absent(),
        Some(Value::Null) if field.not_null => {
            return FieldOutcome::failed(FieldError::NullNotAllowed)
        }
        Some(Value::Null) => return FieldOutcome::value(Value::Null),
        Some(v) => v,
    };

    match &field.kind {
        FieldKind::Leaf(rules) => FieldOutcome::from_result(validate_leaf(value, rules)),
        FieldKind::Object(spec) => match value.as_object() {
            Some(obj) => {
                let outcome = validate_object(obj, spec);
                FieldOutcome {
                    parsed: outcome.parsed.map(Value::Object),
                    error: outcome.error.map(FieldError::ObjectValidation),
                }
            }
            None => FieldOutcome::failed(FieldError::ExpectedObject {
                bad_value: BadValue::Value(value.clone()),
            }),
        },
        FieldKind::Map(spec) => match value.as_object() {
            Some(obj) => validate_map(obj, spec),
            None => FieldOutcome::failed(FieldError::ExpectedObject {
                bad_value: BadValue::Value(value.clone()),
            }),
        },
    }
}

/// The value after delimiter splitting and parsing. `None` entries are
/// strings the parser could not convert.
enum Live {
    Scalar(Option<Value>),
    Sequence(Vec<Option<Value>>),
}

fn validate_leaf(value: &Value, rules: &LeafRules) -> Result<Value, FieldError> {
    let live = split_and_parse(value, rules)?;
    let live = check_type(live, rules)?;

    if let Some(fetch) = &rules.fetch {
        return fetch_records(fetch, rules.delimiter.is_some(), live);
    }
    if let Some(spec) = &rules.object_array {
        return validate_object_array(live, spec);
    }
    Ok(live)
}

fn split_and_parse(value: &Value, rules: &LeafRules) -> Result<Live, FieldError> {
    let parse = |v: Value| match &rules.parser {
        Some(parser) => parser.apply(v),
        None => Some(v),
    };

    match (&rules.delimiter, value) {
        (Some(delimiter), Value::String(s)) => Ok(Live::Sequence(
            split(s, delimiter)
                .map(|part| parse(Value::String(part.to_string())))
                .collect(),
        )),
        // already split; parsed element-wise either way
        (_, Value::Array(items)) => Ok(Live::Sequence(items.iter().cloned().map(parse).collect())),
        (Some(_), other) => Err(FieldError::WrongType {
            bad_value: BadValue::Value(other.clone()),
            index: None,
        }),
        (None, other) => Ok(Live::Scalar(parse(other.clone()))),
    }
}

/// An empty delimiter splits into characters.
fn split<'a>(s: &'a str, delimiter: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if delimiter.is_empty() {
        Box::new(s.char_indices().map(move |(i, c)| &s[i..i + c.len_utf8()]))
    } else {
        Box::new(s.split(delimiter))
    }
}

fn check_type(live: Live, rules: &LeafRules) -> Result<Value, FieldError> {
    let items = match live {
        Live::Sequence(items) => items,
        Live::Scalar(Some(Value::Array(items))) => items.into_iter().map(Some).collect(),
        Live::Scalar(scalar) => {
            if rules.ensure_array {
                return Err(FieldError::ExpectedArray {
                    bad_value: scalar.into(),
                });
            }
            return match scalar {
                Some(v) if rules.type_check.check(&v) => Ok(v),
                other => Err(FieldError::WrongType {
                    bad_value: other.into(),
                    index: None,
                }),
            };
        }
    };

    let mut checked = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Some(v) if rules.type_check.check(&v) => checked.push(v),
            other => {
                return Err(FieldError::WrongType {
                    bad_value: other.into(),
                    index: Some(i),
                })
            }
        }
    }
    Ok(Value::Array(checked))
}

fn fetch_records(fetch: &FetchRules, delimited: bool, live: Value) -> Result<Value, FieldError> {
    let many = delimited || fetch.many;
    let method = fetch.method.clone().unwrap_or(if many {
        FetchMethod::Many
    } else {
        FetchMethod::One
    });
    let keys: &[Value] = match &live {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };
    let expected = if many { keys.len() } else { 1 };

    debug!(%method, expected, "fetching records");
    let fetched = match &method {
        FetchMethod::One => fetch.model.fetch_one(&live).map(Fetched::One),
        FetchMethod::Many => fetch.model.fetch_many(keys).map(Fetched::Many),
        FetchMethod::Named(name) => {
            let key = if many {
                FetchKey::Many(keys)
            } else {
                FetchKey::One(&live)
            };
            fetch.model.fetch_named(name, key)
        }
    }
    .map_err(|e| {
        debug!(%method, error = %e, "record lookup failed");
        FieldError::FetchFailed(e)
    })?;

    let actual = fetched.count();
    if fetch.must_exist && actual != expected {
        debug!(expected, actual, "requested records missing");
        return Err(FieldError::NotFound { expected, actual });
    }
    Ok(fetched.into_value())
}

fn validate_object_array(live: Value, spec: &Spec) -> Result<Value, FieldError> {
    let items = match live {
        Value::Array(items) => items,
        other => {
            return Err(FieldError::ExpectedArray {
                bad_value: BadValue::Value(other),
            })
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    let mut errors = ElementErrors::new();
    for (i, item) in items.iter().enumerate() {
        trace!(index = i, "validating array element");
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => {
                errors.push(
                    i,
                    FieldError::ExpectedObject {
                        bad_value: BadValue::Value(item.clone()),
                    },
                );
                continue;
            }
        };
        let outcome = validate_object(obj, spec);
        match outcome.error {
            Some(e) => errors.push(i, FieldError::ObjectValidation(e)),
            None => parsed.push(Value::Object(outcome.parsed.unwrap_or_default())),
        }
    }

    if errors.is_empty() {
        Ok(Value::Array(parsed))
    } else {
        Err(FieldError::NestedValidation(errors))
    }
}
