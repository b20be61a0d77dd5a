use crate::sink::LineSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all output.
///
/// Useful for measuring classification and formatting cost without any
/// terminal I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LineSink for NoopSink {
    async fn send(&self, _chunk: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
