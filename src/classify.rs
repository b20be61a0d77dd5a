use serde_json::{Map, Value};

use crate::record::is_truthy;

/// Outcome of trying to decode one input line as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The line is a JSON object.
    Object(Map<String, Value>),
    /// Valid JSON, but not an object (array, string, number, ...).
    NonObjectValue(Value),
    /// Not valid JSON at all.
    ParseError,
}

/// Result of classifying a line: either a structured log record ready for
/// normalization, or an opaque line that is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified<'a> {
    Opaque(&'a str),
    Structured(Map<String, Value>),
}

/// Decode a raw line. Never fails; a decode error is just another variant.
pub fn decode(line: &str) -> Decoded {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Decoded::Object(map),
        Ok(other) => Decoded::NonObjectValue(other),
        Err(_) => Decoded::ParseError,
    }
}

/// Decide whether `line` is a structured log record.
///
/// Only JSON objects carrying a truthy `level` field qualify. Everything
/// else (malformed JSON, arrays, scalars, objects without a level) is
/// returned as [`Classified::Opaque`] with the original text.
pub fn classify(line: &str) -> Classified<'_> {
    match decode(line) {
        Decoded::Object(map) if has_level(&map) => Classified::Structured(map),
        _ => Classified::Opaque(line),
    }
}

/// Classify an already-decoded value. Returns the object when it is a
/// structured log record, `None` otherwise.
pub fn classify_value(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object().filter(|map| has_level(map))
}

fn has_level(map: &Map<String, Value>) -> bool {
    map.get("level").map(is_truthy).unwrap_or(false)
}
