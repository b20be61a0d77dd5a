use std::error::Error;

/// Failures that stop a [`Pipeline`](crate::pipeline::Pipeline).
///
/// Malformed input is never an error; only the surrounding I/O can fail.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("output sink failed: {0}")]
    Sink(Box<dyn Error + Send + Sync>),

    #[error("output writer stopped before the input was drained")]
    WriterClosed,

    #[error("output writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
