//! Environment variable names read by the `log-colada` binary.
//!
//! The library itself never reads the environment; these are helpers for
//! front-ends that want the same knobs.

/// Color mode: `auto`, `always` or `never`.
pub const LOG_COLADA_COLOR_ENV: &str = "LOG_COLADA_COLOR";

/// Capacity of the channel between the reader and the output writer.
pub const LOG_COLADA_BUFFER_ENV: &str = "LOG_COLADA_BUFFER";

/// `tracing` filter directive for the tool's own diagnostics (stderr).
pub const LOG_COLADA_LOG_ENV: &str = "LOG_COLADA_LOG";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
