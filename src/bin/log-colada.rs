use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, error};

use log_colada::env::{env_or, LOG_COLADA_BUFFER_ENV, LOG_COLADA_COLOR_ENV};
use log_colada::init::{init_tracing, PipelineConfig};
use log_colada::pipeline::run;
use log_colada::sink::WriterSink;
use log_colada::style::{ColorMode, StyleConfig};
use log_colada::Prettifier;

/// Pretty-print newline-delimited JSON logs from stdin.
#[derive(Parser, Debug)]
#[command(name = "log-colada", version, about)]
struct Cli {
    /// When to color output: auto, always or never.
    #[arg(long)]
    color: Option<ColorMode>,

    /// Formatted lines allowed to queue ahead of a slow stdout.
    #[arg(long)]
    buffer: Option<usize>,

    /// Silence the tool's own diagnostics on stderr.
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let color = self.color.unwrap_or_else(|| {
            env_or(LOG_COLADA_COLOR_ENV, "auto")
                .parse()
                .unwrap_or(ColorMode::Auto)
        });
        let channel_buffer = self.buffer.unwrap_or_else(|| {
            env_or(LOG_COLADA_BUFFER_ENV, "")
                .parse()
                .unwrap_or(defaults.channel_buffer)
        });
        PipelineConfig {
            channel_buffer,
            color,
            enable_diagnostics: !self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    init_tracing(&config);
    debug!(?config, "starting");

    let prettifier = Prettifier::new(StyleConfig::from_mode(config.color));
    let sink = Arc::new(WriterSink::new(tokio::io::stdout()));
    let stdin = BufReader::new(tokio::io::stdin());

    match run(stdin, sink, prettifier, config.channel_buffer).await {
        Ok(stats) => {
            debug!(?stats, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "log-colada stopped");
            ExitCode::FAILURE
        }
    }
}
