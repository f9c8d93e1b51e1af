use serde_json::Value;

/// Input could not be turned into an object to validate.
///
/// Distinct from validation failures: nothing was checked.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "std")]
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected an object to validate, received {found}")]
    NotAnObject { found: &'static str },
}

/// Trait for types that can be validated against a [`Spec`](crate::Spec).
///
/// Implemented for JSON strings (`&str`, `String`), raw bytes (`&[u8]`),
/// file paths (`Path`, `PathBuf`, with the `std` feature), and
/// `serde_json::Value`.
pub trait ScrubInput {
    /// Convert this input into a `serde_json::Value`.
    fn to_json_value(&self) -> Result<Value, InputError>;
}

impl ScrubInput for Value {
    fn to_json_value(&self) -> Result<Value, InputError> {
        Ok(self.clone())
    }
}

impl ScrubInput for str {
    fn to_json_value(&self) -> Result<Value, InputError> {
        Ok(serde_json::from_str(self)?)
    }
}

impl ScrubInput for String {
    fn to_json_value(&self) -> Result<Value, InputError> {
        self.as_str().to_json_value()
    }
}

impl ScrubInput for [u8] {
    fn to_json_value(&self) -> Result<Value, InputError> {
        Ok(serde_json::from_slice(self)?)
    }
}

#[cfg(feature = "std")]
impl ScrubInput for std::path::Path {
    fn to_json_value(&self) -> Result<Value, InputError> {
        let content = std::fs::read_to_string(self)?;
        content.as_str().to_json_value()
    }
}

#[cfg(feature = "std")]
impl ScrubInput for std::path::PathBuf {
    fn to_json_value(&self) -> Result<Value, InputError> {
        self.as_path().to_json_value()
    }
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
