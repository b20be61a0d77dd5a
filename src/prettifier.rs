use serde_json::Value;
use tracing::trace;

use crate::classify::{classify, classify_value, Classified};
use crate::format::{Formatter, NEWLINE};
use crate::record::LogRecord;
use crate::style::StyleConfig;

/// Input accepted by [`Prettifier::process`]: a raw text line, or a value
/// that was already decoded by the caller.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Line(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(line: &'a str) -> Self {
        Input::Line(line)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(line: &'a String) -> Self {
        Input::Line(line.as_str())
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::Value(value)
    }
}

/// How a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Structured,
    Opaque,
}

/// Classifier and formatter glued together: one input line in, one
/// newline-terminated chunk out. Holds no per-line state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prettifier {
    formatter: Formatter,
}

impl Prettifier {
    pub fn new(style: StyleConfig) -> Self {
        Self { formatter: Formatter::new(style) }
    }

    pub fn process<'a>(&self, input: impl Into<Input<'a>>) -> String {
        match input.into() {
            Input::Line(line) => self.process_line(line),
            Input::Value(value) => self.process_value(value),
        }
    }

    /// Structured lines are rendered; anything else comes back unchanged
    /// with a trailing newline.
    pub fn process_line(&self, line: &str) -> String {
        self.render_line(line).1
    }

    /// Like [`process_line`](Self::process_line), also reporting whether
    /// the line was rendered as a structured record.
    pub fn render_line(&self, line: &str) -> (LineKind, String) {
        match classify(line) {
            Classified::Structured(map) => {
                trace!(len = line.len(), "structured line");
                (LineKind::Structured, self.formatter.render(&LogRecord::from_object(map)))
            }
            Classified::Opaque(text) => {
                trace!(len = text.len(), "opaque line");
                (LineKind::Opaque, format!("{}{}", text, NEWLINE))
            }
        }
    }

    /// Pre-decoded input. Values that are not structured records are echoed
    /// as compact JSON (strings verbatim).
    pub fn process_value(&self, value: &Value) -> String {
        match classify_value(value) {
            Some(map) => self.formatter.render(&LogRecord::from_object(map.clone())),
            None => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}{}", text, NEWLINE)
            }
        }
    }
}
