//! String-to-value conversions applied before a field's type check.
//!
//! A parser returns `None` when the string holds no number at all; the field
//! validator reports that as a wrong-type failure whose bad value reads
//! `NaN`. Boolean parsers never fail: unrecognized tokens become `null` (or
//! `"all"`) and are left for the type predicate to reject.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{Number, Value};

/// A named conversion: `(raw string) -> value`.
///
/// # Example
/// ```
/// use scrub::parsers;
/// use serde_json::json;
///
/// assert_eq!(parsers::string_to_int().parse("42px"), Some(json!(42)));
/// assert_eq!(parsers::string_to_int().parse("abc"), None);
/// ```
#[derive(Clone)]
pub struct Parser {
    name: Arc<str>,
    parse: Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>,
}

impl Parser {
    pub fn new<F>(name: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            parse: Arc::new(parse),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parse(&self, raw: &str) -> Option<Value> {
        (self.parse)(raw)
    }

    /// Apply to a live value. Only strings are converted; anything else is
    /// already typed and passes through.
    pub(crate) fn apply(&self, value: Value) -> Option<Value> {
        match value {
            Value::String(s) => self.parse(&s),
            other => Some(other),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Parser").field(&self.name).finish()
    }
}

/// Leading integer of the string: `" 12px"` -> `12`, `"0x1f"` -> `31`.
pub fn string_to_int() -> Parser {
    Parser::new("string_to_int", parse_leading_int)
}

/// Leading decimal of the string: `"3.5kg"` -> `3.5`, `"1e3"` -> `1000`.
pub fn string_to_decimal() -> Parser {
    Parser::new("string_to_decimal", parse_leading_decimal)
}

/// Exactly `"true"` / `"false"`; anything else becomes `null`.
pub fn string_to_boolean() -> Parser {
    Parser::new("string_to_boolean", |s| Some(token_to_boolean(s)))
}

/// Like [`string_to_boolean`], but every unrecognized token becomes `"all"`.
pub fn string_to_all_boolean() -> Parser {
    Parser::new("string_to_all_boolean", |s| match token_to_boolean(s) {
        Value::Null => Some(Value::String("all".to_string())),
        parsed => Some(parsed),
    })
}

fn token_to_boolean(s: &str) -> Value {
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Null,
    }
}

fn parse_leading_int(s: &str) -> Option<Value> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }

    match i64::from_str_radix(digits, radix) {
        Ok(n) => Some(Value::from(if negative { -n } else { n })),
        Err(_) => {
            // too wide for i64: keep the magnitude as a float
            let magnitude = digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0f64, |acc, d| acc * f64::from(radix) + f64::from(d));
            number_value(if negative { -magnitude } else { magnitude })
        }
    }
}

fn parse_leading_decimal(s: &str) -> Option<Value> {
    static PATTERN: OnceLock<regex_lite::Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        regex_lite::Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?")
            .expect("decimal pattern is valid")
    });
    let matched = pattern.find(s.trim_start())?;
    let parsed: f64 = matched.as_str().parse().ok()?;
    number_value(parsed)
}

/// Whole floats that fit an i64 exactly become integers, so `"4"` and `"4.0"`
/// both parse to `4`.
fn number_value(f: f64) -> Option<Value> {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if f.fract() == 0.0 && f.abs() < EXACT {
        return Some(Value::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_takes_leading_digits() {
        assert_eq!(parse_leading_int("4"), Some(json!(4)));
        assert_eq!(parse_leading_int("  -17abc"), Some(json!(-17)));
        assert_eq!(parse_leading_int("+8"), Some(json!(8)));
        assert_eq!(parse_leading_int("0x1F"), Some(json!(31)));
        assert_eq!(parse_leading_int("3.9"), Some(json!(3)));
        assert_eq!(parse_leading_int("abcde"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn int_overflow_falls_back_to_float() {
        let v = parse_leading_int("123456789012345678901234").unwrap();
        assert!(v.as_f64().unwrap() > 1e23);
    }

    #[test]
    fn decimal_takes_leading_float() {
        assert_eq!(parse_leading_decimal("3.5kg"), Some(json!(3.5)));
        assert_eq!(parse_leading_decimal(".25"), Some(json!(0.25)));
        assert_eq!(parse_leading_decimal("1e3"), Some(json!(1000)));
        assert_eq!(parse_leading_decimal("4.0"), Some(json!(4)));
        assert_eq!(parse_leading_decimal(" -2.5e-1x"), Some(json!(-0.25)));
        assert_eq!(parse_leading_decimal("e5"), None);
        assert_eq!(parse_leading_decimal("Infinity"), None);
    }

    #[test]
    fn boolean_tokens() {
        let p = string_to_boolean();
        assert_eq!(p.parse("true"), Some(json!(true)));
        assert_eq!(p.parse("false"), Some(json!(false)));
        assert_eq!(p.parse("TRUE"), Some(Value::Null));

        let all = string_to_all_boolean();
        assert_eq!(all.parse("false"), Some(json!(false)));
        assert_eq!(all.parse("all"), Some(json!("all")));
        assert_eq!(all.parse("whatever"), Some(json!("all")));
    }

    #[test]
    fn apply_passes_typed_values_through() {
        let p = string_to_int();
        assert_eq!(p.apply(json!(7)), Some(json!(7)));
        assert_eq!(p.apply(json!("7")), Some(json!(7)));
    }
}
