//! Parsing raw values against schema entries
//!
//! [`parse`] turns a raw JSON value into the resolved value for an entry.
//! [`validate`] runs the same checks on a value about to be written and
//! rephrases failures for the caller.

use crate::config::{EntryType, SchemaEntry};
use crate::error::Error;
use serde_json::{Number, Value};
use thiserror::Error as ThisError;

/// What made a raw value unacceptable
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    NotAString,
    NotInEnum,
    NotANumber,
    BelowMin { min: f64 },
    AboveMax { max: f64 },
    NotABoolean,
    /// Raised by a custom parser
    Custom,
}

/// A raw value could not be coerced into an entry's type
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("{reason}")]
pub struct ParseError {
    kind: ParseErrorKind,
    reason: String,
}

impl ParseError {
    fn new(kind: ParseErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Parse a raw value against a schema entry
///
/// # Errors
///
/// Returns a `ParseError` describing why `raw` doesn't fit `entry`.
///
/// # Example
///
/// ```
/// use rtcfg::{parse, SchemaEntry};
/// use serde_json::json;
///
/// let port = SchemaEntry::number().min(1.0).max(65535.0);
/// assert_eq!(parse(&json!("8080"), &port).unwrap(), json!(8080));
/// assert_eq!(parse(&json!(0), &port).unwrap_err().reason(), "0 should be greater than 1");
///
/// let color = SchemaEntry::string_enum(["blue", "green", "pink"]);
/// assert_eq!(
///     parse(&json!("red"), &color).unwrap_err().reason(),
///     r#"red not part of ["blue", "green", "pink"]"#
/// );
/// ```
pub fn parse(raw: &Value, entry: &SchemaEntry) -> Result<Value, ParseError> {
    match entry {
        SchemaEntry::String(e) => {
            let text = parse_string(raw)?;
            if let Some(options) = &e.options {
                if !options.iter().any(|option| option == text) {
                    let allowed: Vec<String> =
                        options.iter().map(|option| format!("\"{option}\"")).collect();
                    return Err(ParseError::new(
                        ParseErrorKind::NotInEnum,
                        format!("{text} not part of [{}]", allowed.join(", ")),
                    ));
                }
            }
            Ok(Value::String(text.to_string()))
        }
        SchemaEntry::Number(e) => {
            let number = parse_number(raw)?;
            if let Some(min) = e.min {
                if number < min {
                    return Err(ParseError::new(
                        ParseErrorKind::BelowMin { min },
                        format!(
                            "{} should be greater than {}",
                            format_number(number),
                            format_number(min)
                        ),
                    ));
                }
            }
            if let Some(max) = e.max {
                if number > max {
                    return Err(ParseError::new(
                        ParseErrorKind::AboveMax { max },
                        format!(
                            "{} should be lower than {}",
                            format_number(number),
                            format_number(max)
                        ),
                    ));
                }
            }
            Ok(number_value(number))
        }
        SchemaEntry::Boolean(_) => parse_boolean(raw).map(Value::Bool),
        SchemaEntry::Custom(e) => {
            (e.parser)(raw).map_err(|message| ParseError::new(ParseErrorKind::Custom, message))
        }
    }
}

/// Validate a value about to be written for `key`
///
/// Returns the parsed value on success. Failures are rephrased per entry type:
/// enum membership, numeric bound, or type name. Custom parser messages are
/// kept verbatim.
///
/// # Errors
///
/// `Error::CustomValue` for custom entries, `Error::InvalidValue` otherwise.
pub fn validate(key: &str, value: &Value, entry: &SchemaEntry) -> Result<Value, Error> {
    let err = match parse(value, entry) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };

    let shown = display_value(value);
    let message = match (err.kind(), entry) {
        (ParseErrorKind::Custom, _) => {
            return Err(Error::CustomValue {
                key: key.to_string(),
                message: err.reason().to_string(),
            });
        }
        (_, SchemaEntry::String(e)) if e.options.is_some() => format!(
            "Expected \"{key}={shown}\" to be one of: {}",
            e.options.as_deref().unwrap_or_default().join(", ")
        ),
        (ParseErrorKind::BelowMin { min }, _) => format!(
            "Expected \"{key}={shown}\" to be greater than {}",
            format_number(*min)
        ),
        (ParseErrorKind::AboveMax { max }, _) => format!(
            "Expected \"{key}={shown}\" to be lower than {}",
            format_number(*max)
        ),
        _ => format!(
            "Expected \"{key}={shown}\" to be a \"{}\"",
            entry.entry_type()
        ),
    };

    Err(Error::InvalidValue {
        key: key.to_string(),
        message,
    })
}

/// Bring a value into the canonical shape `parse` would give it
///
/// Used to compare values of the same entry: `8000.0` and `8000` are equal
/// configuration values.
#[must_use]
pub fn normalize(value: &Value, entry: &SchemaEntry) -> Value {
    match (entry.entry_type(), value) {
        (EntryType::Number, Value::Number(n)) => n.as_f64().map_or_else(|| value.clone(), number_value),
        _ => value.clone(),
    }
}

// =============================================================================
// Per-type coercion
// =============================================================================

fn parse_string(raw: &Value) -> Result<&str, ParseError> {
    raw.as_str()
        .ok_or_else(|| ParseError::new(ParseErrorKind::NotAString, "not a string"))
}

fn parse_number(raw: &Value) -> Result<f64, ParseError> {
    let not_a_number = || ParseError::new(ParseErrorKind::NotANumber, "not a number");
    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(not_a_number),
        Value::String(s) => float_prefix(s)
            .filter(|n| n.is_finite())
            .ok_or_else(not_a_number),
        _ => Err(not_a_number()),
    }
}

fn parse_boolean(raw: &Value) -> Result<bool, ParseError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ParseError::new(ParseErrorKind::NotABoolean, "not a boolean")),
    }
}

/// Parse the longest decimal prefix of `s` (after leading whitespace)
///
/// `"42px"` gives `42`, `"  -1.5e3 "` gives `-1500`, `"px"` gives `None`.
/// Words like `inf` / `NaN` are not accepted.
fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Integral floats become integers so equal numbers compare equal as `Value`s
pub(crate) fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn format_number(n: f64) -> String {
    match number_value(n) {
        Value::Null => n.to_string(),
        value => value.to_string(),
    }
}

/// Render a value inside a message: strings bare, everything else as JSON
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    }
}

// =============================================================================
// Persisted encoding
// =============================================================================

/// Text persisted for a validated value
///
/// String entries keep the string as is; every other entry stores compact JSON.
pub(crate) fn encode_value(value: &Value, entry: &SchemaEntry) -> String {
    match (entry, value) {
        (SchemaEntry::String(_), Value::String(s)) => s.clone(),
        _ => value.to_string(),
    }
}

/// Raw value for persisted text, ready to be parsed
///
/// String entries take the text verbatim. Other entries decode JSON and fall
/// back to the text itself, so a hand-written `42` or `true` still parses.
pub(crate) fn decode_raw(raw: &str, entry: &SchemaEntry) -> Value {
    match entry {
        SchemaEntry::String(_) => Value::String(raw.to_string()),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

// =============================================================================
// Tests
// =============================================================================
