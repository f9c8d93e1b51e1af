//! Value classification predicates used as field types.
//!
//! Each predicate is total and side-effect free. The string-format checks
//! (`uuid`, `email`, `fqdn`, `rfqdn`, `iso8601`, `e164`) reject non-string
//! values before looking at the content.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

/// A named type check: `(value) -> bool`.
///
/// # Example
/// ```
/// use scrub::types::{self, Predicate};
/// use serde_json::json;
///
/// assert!(types::string().check(&json!("hi")));
///
/// let even = Predicate::new("even", |v| v.as_i64().map_or(false, |n| n % 2 == 0));
/// assert!(even.check(&json!(4)));
/// assert!(!even.check(&json!(5)));
/// ```
#[derive(Clone)]
pub struct Predicate {
    name: Arc<str>,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in predicates
// ---------------------------------------------------------------------------

pub fn string() -> Predicate {
    Predicate::new("string", Value::is_string)
}

/// Any JSON number. JSON cannot carry `NaN`, and parser failures never reach
/// the predicate, so every number passes.
pub fn number() -> Predicate {
    Predicate::new("number", Value::is_number)
}

pub fn boolean() -> Predicate {
    Predicate::new("boolean", Value::is_boolean)
}

/// A JSON object. Used as the element type of object-array fields.
pub fn object() -> Predicate {
    Predicate::new("object", Value::is_object)
}

/// Hyphenated version-4 UUID.
pub fn uuid() -> Predicate {
    Predicate::new("uuid", |v| v.as_str().map_or(false, is_valid_uuid_v4))
}

pub fn email() -> Predicate {
    Predicate::new("email", |v| v.as_str().map_or(false, is_valid_email))
}

/// Fully qualified domain name with a top-level domain.
pub fn fqdn() -> Predicate {
    Predicate::new("fqdn", |v| v.as_str().map_or(false, is_valid_fqdn))
}

/// Reverse-label domain name, e.g. `io.example.host`.
pub fn rfqdn() -> Predicate {
    Predicate::new("rfqdn", |v| {
        v.as_str().map_or(false, |s| {
            let reversed: Vec<&str> = s.split('.').rev().collect();
            is_valid_fqdn(&reversed.join("."))
        })
    })
}

/// ISO 8601 date or date-time.
pub fn iso8601() -> Predicate {
    Predicate::new("iso8601", |v| v.as_str().map_or(false, is_valid_iso8601))
}

/// E.164 phone number, e.g. `+14155552671`.
pub fn e164() -> Predicate {
    Predicate::new("e164", |v| {
        v.as_str().map_or(false, |s| e164_pattern().is_match(s))
    })
}

/// `true`, `false`, or the literal token `"all"`.
pub fn all_boolean() -> Predicate {
    Predicate::new("all_boolean", |v| match v {
        Value::Bool(_) => true,
        Value::String(s) => s == "all",
        _ => false,
    })
}

/// Accepts anything. For fields whose real checks happen elsewhere.
pub fn custom() -> Predicate {
    Predicate::new("custom", |_| true)
}

// ---------------------------------------------------------------------------
// Format checks
// ---------------------------------------------------------------------------

fn e164_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"^\+[1-9]\d{1,14}$").expect("e164 pattern is valid")
    })
}

fn is_valid_uuid_v4(s: &str) -> bool {
    // 8-4-4-4-12 hex with dashes only; the uuid crate also accepts other forms
    if s.len() != 36 {
        return false;
    }
    let bytes = s.as_bytes();
    for i in [8, 13, 18, 23] {
        if bytes[i] != b'-' {
            return false;
        }
    }
    match uuid::Uuid::parse_str(s) {
        Ok(id) => id.get_version_num() == 4 && id.get_variant() == uuid::Variant::RFC4122,
        Err(_) => false,
    }
}

fn is_valid_email(s: &str) -> bool {
    let at = match s.rfind('@') {
        Some(pos) if pos > 0 => pos,
        _ => return false,
    };
    let local = &s[..at];
    let domain = &s[at + 1..];

    if local.len() > 64 || local.starts_with('.') || local.ends_with('.') || local.contains("..")
    {
        return false;
    }
    for ch in local.chars() {
        if ch.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(ch) {
            continue;
        }
        return false;
    }

    is_valid_fqdn(domain)
}

fn is_valid_fqdn(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = s.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }
    // TLD: letters only, at least two
    labels
        .last()
        .map_or(false, |tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_valid_iso8601(s: &str) -> bool {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    if DateTime::parse_from_rfc3339(s).is_ok() {
        return true;
    }
    const DATE_TIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y%m%dT%H%M%S%.f",
        "%Y%m%dT%H%M%SZ",
    ];
    for fmt in DATE_TIME_FORMATS {
        if NaiveDateTime::parse_from_str(s, fmt).is_ok() || DateTime::parse_from_str(s, fmt).is_ok()
        {
            return true;
        }
    }
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y-%j"];
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
        || reduced_date_pattern().is_match(s)
}

/// Reduced-precision dates chrono will not parse alone: `2016`, `2016-05`,
/// and week dates such as `2016-W18` or `2016W183`.
fn reduced_date_pattern() -> &'static regex_lite::Regex {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex_lite::Regex::new(
            r"^\d{4}(-(0[1-9]|1[0-2])|-?W(0[1-9]|[1-4]\d|5[0-3])(-?[1-7])?)?$",
        )
        .expect("reduced date pattern is valid")
    })
}
