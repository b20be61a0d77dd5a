use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::humanize::{parse_leading_int, truncate_to_i64};

/// Fields that are either rendered by a dedicated segment or deliberately
/// dropped as noise. Everything else on a record ends up in the remainder.
pub const CONSUMED_FIELDS: &[&str] = &[
    "level",
    "name",
    "service",
    "namespace",
    "res",
    "req",
    "statusCode",
    "httpRequest",
    "reqId",
    "responseTime",
    "elapsed",
    "method",
    "contentLength",
    "responseBody",
    "url",
    "message",
    "time",
    "pid",
    "hostname",
    "severity",
    "err",
];

/// Severity of a structured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// Unrecognized level, kept as its raw text. Rendered as `userlvl`.
    User(String),
}

impl Level {
    /// Map a raw `level` value. Numeric codes 10..=60 (step 10) and the six
    /// level names are recognized; anything else is kept verbatim.
    pub fn from_value(value: &Value) -> Level {
        match value {
            // `30` and `30.0` are the same level.
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 10.0 => Level::Trace,
                Some(f) if f == 20.0 => Level::Debug,
                Some(f) if f == 30.0 => Level::Info,
                Some(f) if f == 40.0 => Level::Warn,
                Some(f) if f == 50.0 => Level::Error,
                Some(f) if f == 60.0 => Level::Fatal,
                _ => Level::User(n.to_string()),
            },
            Value::String(s) => match s.as_str() {
                "trace" => Level::Trace,
                "debug" => Level::Debug,
                "info" => Level::Info,
                "warn" => Level::Warn,
                "error" => Level::Error,
                "fatal" => Level::Fatal,
                _ => Level::User(s.clone()),
            },
            other => Level::User(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::User(_) => "userlvl",
        }
    }

    /// Error and fatal records are the only ones that show stacks and
    /// error objects.
    pub fn is_failure(&self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, normalized form of one structured log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: Level,
    pub message: Option<Value>,
    pub name: String,
    pub namespace: String,
    /// `None` means "render the current time".
    pub time: Option<DateTime<Utc>>,
    pub method: Option<String>,
    pub url: Option<String>,
    /// `None` renders as the `xxx` placeholder when a method is present.
    pub status_code: Option<String>,
    pub content_length: Option<i64>,
    pub response_time: Option<i64>,
    pub stack: Option<String>,
    pub err: Option<Value>,
    pub remainder: Map<String, Value>,
}

impl LogRecord {
    /// Normalize a decoded object that is known to carry a `level`.
    pub fn from_object(mut obj: Map<String, Value>) -> LogRecord {
        let level = obj
            .get("level")
            .map(Level::from_value)
            .unwrap_or_else(|| Level::User(String::new()));

        let mut extra_consumed: Vec<&str> = Vec::new();

        let message = match obj.get("message").filter(|v| is_truthy(v)) {
            Some(m) => Some(m.clone()),
            None => {
                let msg = obj.get("msg").filter(|v| !v.is_null()).cloned();
                if msg.is_some() {
                    extra_consumed.push("msg");
                }
                msg
            }
        };

        let namespace = match obj.get("namespace") {
            Some(ns) => text_or_empty(ns),
            None => match obj.get("ns") {
                Some(ns) => {
                    extra_consumed.push("ns");
                    text_or_empty(ns)
                }
                None => String::new(),
            },
        };

        let name = obj.get("name").map(text_or_empty).unwrap_or_default();
        let time = obj.get("time").filter(|v| is_truthy(v)).and_then(parse_time);

        let req = obj.get("req").and_then(Value::as_object);
        let res = obj.get("res").and_then(Value::as_object);
        let method = nested_or_top(req, &obj, "method").map(display_text);
        let url = nested_or_top(req, &obj, "url").map(display_text);
        let status_code = nested_or_top(res, &obj, "statusCode")
            .filter(|v| is_truthy(v))
            .map(display_text);

        let response_time = match obj.get("responseTime") {
            Some(rt) if is_truthy(rt) => Some(rt),
            _ => obj.get("elapsed"),
        }
        .filter(|v| !v.is_null())
        .and_then(parse_leading_int);

        let explicit_length = obj.get("contentLength").filter(|v| !v.is_null());
        let content_length = match obj.get("responseBody") {
            Some(body) if is_truthy(body) && !explicit_length.map(is_truthy).unwrap_or(false) => {
                Some(dump_one_line(body).encode_utf16().count() as i64)
            }
            _ => explicit_length.and_then(parse_leading_int),
        }
        .filter(|n| *n >= 0);

        let err_obj = obj.get("err");
        let stack = if level.is_failure() {
            match obj.get("stack").filter(|v| is_truthy(v)) {
                Some(stack) => Some(display_text(stack)),
                None => err_obj
                    .and_then(|e| e.get("stack"))
                    .filter(|v| is_truthy(v))
                    .map(display_text),
            }
        } else {
            None
        };

        let err = match err_obj {
            Some(e) if level.is_failure() && has_error_detail(e) => Some(e.clone()),
            _ => None,
        };

        obj.retain(|key, _| {
            !CONSUMED_FIELDS.contains(&key.as_str()) && !extra_consumed.contains(&key.as_str())
        });

        LogRecord {
            level,
            message,
            name,
            namespace,
            time,
            method,
            url,
            status_code,
            content_length,
            response_time,
            stack,
            err,
            remainder: obj,
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Plain text of a value: strings verbatim, everything else as compact JSON.
pub(crate) fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pretty-printed JSON with the newlines removed, so it fits on one line.
pub(crate) fn dump_one_line(value: &Value) -> String {
    let empty = match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(_) => false,
        _ => true,
    };
    if empty {
        return String::new();
    }
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .replace('\n', "")
}

fn text_or_empty(value: &Value) -> String {
    if is_truthy(value) {
        display_text(value)
    } else {
        String::new()
    }
}

fn nested_or_top<'a>(
    nested: Option<&'a Map<String, Value>>,
    top: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Value> {
    nested
        .and_then(|n| n.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| top.get(key))
        .filter(|v| !v.is_null())
}

fn has_error_detail(err: &Value) -> bool {
    match err {
        Value::Object(map) => map.keys().any(|k| k != "stack"),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => false,
    }
}

fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().and_then(truncate_to_i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> LogRecord {
        match value {
            Value::Object(map) => LogRecord::from_object(map),
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn numeric_levels_map_to_names() {
        let expected = [
            (10, Level::Trace),
            (20, Level::Debug),
            (30, Level::Info),
            (40, Level::Warn),
            (50, Level::Error),
            (60, Level::Fatal),
        ];
        for (code, level) in expected {
            assert_eq!(Level::from_value(&json!(code)), level);
        }
    }

    #[test]
    fn whole_float_levels_map_to_names() {
        assert_eq!(Level::from_value(&json!(30.0)), Level::Info);
        assert_eq!(Level::from_value(&json!(50.0)), Level::Error);
        assert_eq!(Level::from_value(&json!(30.5)), Level::User("30.5".to_string()));
    }

    #[test]
    fn unknown_numeric_level_keeps_raw_value() {
        let level = Level::from_value(&json!(35));
        assert_eq!(level, Level::User("35".to_string()));
        assert_eq!(level.as_str(), "userlvl");
    }

    #[test]
    fn msg_is_used_when_message_missing() {
        let r = record(json!({"level": 30, "msg": "hello"}));
        assert_eq!(r.message, Some(json!("hello")));
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn message_wins_over_msg() {
        let r = record(json!({"level": 30, "message": "a", "msg": "b"}));
        assert_eq!(r.message, Some(json!("a")));
        assert_eq!(r.remainder.get("msg"), Some(&json!("b")));
    }

    #[test]
    fn nested_request_fields_win() {
        let r = record(json!({
            "level": "info",
            "method": "POST",
            "url": "/top",
            "statusCode": 500,
            "req": {"method": "GET", "url": "/nested"},
            "res": {"statusCode": 200}
        }));
        assert_eq!(r.method.as_deref(), Some("GET"));
        assert_eq!(r.url.as_deref(), Some("/nested"));
        assert_eq!(r.status_code.as_deref(), Some("200"));
    }

    #[test]
    fn top_level_request_fields_are_fallback() {
        let r = record(json!({"level": "info", "method": "PUT", "req": {"id": 1}}));
        assert_eq!(r.method.as_deref(), Some("PUT"));
        assert_eq!(r.status_code, None);
    }

    #[test]
    fn response_time_beats_elapsed() {
        let r = record(json!({"level": "info", "responseTime": 12, "elapsed": 99}));
        assert_eq!(r.response_time, Some(12));
        let r = record(json!({"level": "info", "elapsed": "99"}));
        assert_eq!(r.response_time, Some(99));
    }

    #[test]
    fn unparsable_numbers_are_absent() {
        let r = record(json!({"level": "info", "responseTime": "slow", "contentLength": "big"}));
        assert_eq!(r.response_time, None);
        assert_eq!(r.content_length, None);
    }

    #[test]
    fn content_length_derived_from_body() {
        let r = record(json!({"level": "info", "responseBody": {"ok": true}}));
        // `{  "ok": true}`
        assert_eq!(r.content_length, Some(14));

        let r = record(json!({"level": "info", "contentLength": 10, "responseBody": {"ok": true}}));
        assert_eq!(r.content_length, Some(10));

        let r = record(json!({"level": "info", "contentLength": -3}));
        assert_eq!(r.content_length, None);

        // Length counts UTF-16 units: `"😀"` is 1 + 2 + 1.
        let r = record(json!({"level": "info", "responseBody": "😀"}));
        assert_eq!(r.content_length, Some(4));

        let r = record(json!({"level": "info", "contentLength": 1e300, "responseTime": u64::MAX}));
        assert_eq!(r.content_length, None);
        assert_eq!(r.response_time, None);
    }

    #[test]
    fn stack_only_for_failures() {
        let r = record(json!({"level": "info", "stack": "trace"}));
        assert_eq!(r.stack, None);
        assert_eq!(r.remainder.get("stack"), Some(&json!("trace")));

        let r = record(json!({"level": "error", "stack": "top"}));
        assert_eq!(r.stack.as_deref(), Some("top"));
        assert_eq!(Value::Object(r.remainder), json!({"stack": "top"}));
    }

    #[test]
    fn err_with_only_stack_is_folded() {
        let r = record(json!({"level": 50, "err": {"stack": "Error: x\n  at y"}}));
        assert_eq!(r.stack.as_deref(), Some("Error: x\n  at y"));
        assert_eq!(r.err, None);
    }

    #[test]
    fn err_with_detail_is_kept() {
        let r = record(json!({"level": 60, "err": {"message": "boom", "stack": "s"}}));
        assert_eq!(r.stack.as_deref(), Some("s"));
        assert_eq!(r.err, Some(json!({"message": "boom", "stack": "s"})));
    }

    #[test]
    fn err_array_counts_as_detail() {
        let r = record(json!({"level": "error", "err": [1, 2]}));
        assert_eq!(r.err, Some(json!([1, 2])));
        let r = record(json!({"level": "error", "err": []}));
        assert_eq!(r.err, None);
    }

    #[test]
    fn err_ignored_below_error_level() {
        let r = record(json!({"level": 40, "err": {"message": "boom"}}));
        assert_eq!(r.err, None);
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn remainder_is_set_difference() {
        let r = record(json!({
            "level": "info",
            "message": "x",
            "custom1": "a",
            "custom2": 2,
            "pid": 1,
            "hostname": "box",
            "reqId": "r1"
        }));
        assert_eq!(Value::Object(r.remainder), json!({"custom1": "a", "custom2": 2}));
    }

    #[test]
    fn ns_is_namespace_alias() {
        let r = record(json!({"level": "info", "ns": "db"}));
        assert_eq!(r.namespace, "db");
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn time_accepts_epoch_millis_and_rfc3339() {
        let r = record(json!({"level": "info", "time": 1_700_000_000_000i64}));
        assert_eq!(r.time.map(|t| t.timestamp()), Some(1_700_000_000));
        let r = record(json!({"level": "info", "time": "2023-11-14T22:13:20Z"}));
        assert_eq!(r.time.map(|t| t.timestamp()), Some(1_700_000_000));
        let r = record(json!({"level": "info", "time": "yesterday"}));
        assert_eq!(r.time, None);
    }
}
