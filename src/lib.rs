pub mod record;
pub mod classify;
pub mod humanize;
pub mod style;
pub mod format;
pub mod prettifier;

pub mod sink;
pub mod noop_sink;
pub mod pipeline;
pub mod error;

pub mod init;
pub mod env;

pub use classify::{classify, classify_value, decode, Classified, Decoded};
pub use format::Formatter;
pub use prettifier::{Input, LineKind, Prettifier};
pub use record::{Level, LogRecord};
pub use style::{ColorMode, StyleConfig};
