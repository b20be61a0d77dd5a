use chrono::{DateTime, Local, Utc};
use colored::Color;
use serde_json::{json, Map, Value};

use crate::humanize::{format_bytes, format_millis};
use crate::record::{display_text, dump_one_line, Level, LogRecord};
use crate::style::{Style, StyleConfig};

pub const NEWLINE: &str = "\n";

/// Placeholder shown for a missing status code on HTTP lines.
pub const STATUS_PLACEHOLDER: &str = "xxx";

const GRAY: Style = Style::fg(Color::BrightBlack);
const WHITE: Style = Style::fg(Color::White);
const CYAN: Style = Style::fg(Color::Cyan);
const BLUE: Style = Style::fg(Color::Blue);

/// Renders canonical records into one (possibly multi-line) output chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    style: StyleConfig,
}

impl Formatter {
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Render `record` as segments joined by single spaces, newline-terminated.
    /// Empty segments are dropped.
    pub fn render(&self, record: &LogRecord) -> String {
        let paint = |text: &str, style: Style| self.style.paint(text, style);
        let mut segments: Vec<String> = Vec::with_capacity(12);

        segments.push(paint(&format_time(record.time.unwrap_or_else(Utc::now)), GRAY));
        segments.push(format_level(&record.level).to_string());
        segments.push(paint(&record.namespace, CYAN));
        segments.push(paint(&record.name, BLUE));
        if let Some(message) = &record.message {
            segments.push(paint(&format_message_name(message), message_style(&record.level)));
        }

        if let Some(method) = &record.method {
            segments.push(paint(method, WHITE));
            let status = record.status_code.as_deref().unwrap_or(STATUS_PLACEHOLDER);
            segments.push(paint(status, WHITE));
        }
        if let Some(url) = &record.url {
            segments.push(paint(url, WHITE));
        }
        if let Some(length) = record.content_length {
            segments.push(paint(&format_bytes(length).replacen(' ', "", 1), GRAY));
        }
        if let Some(millis) = record.response_time {
            segments.push(paint(&format_millis(millis), GRAY));
        }

        if let Some(stack) = &record.stack {
            segments.push(format!("{}{}", NEWLINE, stack));
        }
        if let Some(err) = &record.err {
            segments.push(format_error_block(err));
        }
        segments.push(format_remainder(&record.remainder));

        let mut line = segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        line.push_str(NEWLINE);
        line
    }
}

/// Local wall-clock `HH:MM:SS`.
pub fn format_time(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Level glyph. The warning sign renders narrower than the other emoji and
/// gets one trailing space so the following columns line up.
pub fn format_level(level: &Level) -> &'static str {
    match level {
        Level::Trace => "🔍",
        Level::Debug => "🐛",
        Level::Info => "✨",
        Level::Warn => "⚠️ ",
        Level::Error => "🚨",
        Level::Fatal => "💀",
        Level::User(_) => "  ",
    }
}

/// Replace well-known framework phrases with short arrows.
pub fn format_message_name(message: &Value) -> String {
    match message.as_str() {
        Some("request") | Some("incoming request") => "<--".to_string(),
        Some("response") | Some("request completed") => "-->".to_string(),
        Some("response body") => "|-|".to_string(),
        _ => display_text(message),
    }
}

fn message_style(level: &Level) -> Style {
    match level {
        Level::Error => Style::fg(Color::Red),
        Level::Trace => WHITE,
        Level::Warn => Style::fg(Color::Magenta),
        Level::Debug => Style::fg(Color::Yellow),
        Level::Info | Level::User(_) => Style::fg(Color::Green),
        Level::Fatal => WHITE.on(Color::Red),
    }
}

/// Line break followed by an indented dump of `{ "err": ... }`.
pub fn format_error_block(err: &Value) -> String {
    let wrapped = json!({ "err": err });
    let dump = serde_json::to_string_pretty(&wrapped).unwrap_or_else(|_| wrapped.to_string());
    format!("{}{}", NEWLINE, dump)
}

/// One-line dump of the remainder fields, or empty when there are none.
pub fn format_remainder(remainder: &Map<String, Value>) -> String {
    if remainder.is_empty() {
        return String::new();
    }
    dump_one_line(&Value::Object(remainder.clone()))
}
