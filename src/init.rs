use crate::env::{env_or, LOG_COLADA_LOG_ENV};
use crate::style::ColorMode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Default filter for the tool's own diagnostics.
pub const DEFAULT_DIAGNOSTICS_FILTER: &str = "warn";

/// Settings for one prettifying run.
///
/// **Fields**
/// - `channel_buffer`: number of formatted lines that may wait for the
///   output writer before the reader is paused.
/// - `color`: how to decide whether output is colored.
/// - `enable_diagnostics`: if `true`, the tool's own `tracing` events are
///   printed to stderr. Stdout only ever carries prettified lines.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub channel_buffer: usize,
    pub color: ColorMode,
    pub enable_diagnostics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 64,
            color: ColorMode::Auto,
            enable_diagnostics: true,
        }
    }
}

/// Install the global `tracing` subscriber for diagnostics.
///
/// The filter comes from `LOG_COLADA_LOG` (default `warn`). Output goes to
/// stderr without ANSI colors so it never mixes escape codes into piped
/// logs. Does nothing when diagnostics are disabled, and is a no-op if a
/// subscriber is already installed.
pub fn init_tracing(config: &PipelineConfig) {
    if !config.enable_diagnostics {
        return;
    }

    let filter = EnvFilter::try_new(env_or(LOG_COLADA_LOG_ENV, DEFAULT_DIAGNOSTICS_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIAGNOSTICS_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}
