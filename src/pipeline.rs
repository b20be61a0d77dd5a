use crate::error::PipelineError;
use crate::prettifier::{LineKind, Prettifier};
use crate::sink::LineSink;
use serde::Serialize;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Streaming front-end: formats lines as they arrive and hands the output
/// to a [`LineSink`] through a bounded channel and a background writer task.
///
/// The channel is bounded and `push` waits for capacity, so a slow sink
/// slows the reader down instead of growing a buffer. Lines are never
/// dropped or reordered.
pub struct Pipeline {
    sender: mpsc::Sender<String>,
    prettifier: Prettifier,
    /// Lines seen so far.
    pub total_lines: Arc<AtomicU64>,
    /// Lines rendered as structured records.
    pub structured_lines: Arc<AtomicU64>,
    /// Lines passed through unchanged.
    pub opaque_lines: Arc<AtomicU64>,
    /// Chunks accepted by the sink.
    pub written_lines: Arc<AtomicU64>,
}

/// Counters reported when a pipeline finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub total: u64,
    pub structured: u64,
    pub opaque: u64,
    pub written: u64,
}

impl Pipeline {
    /// Create a pipeline and spawn the writer task that drains the channel
    /// into `sink`. The task flushes the sink once every sender is gone.
    ///
    /// `buffer` is clamped to at least 1.
    pub fn new(
        sink: Arc<dyn LineSink>,
        prettifier: Prettifier,
        buffer: usize,
    ) -> (Self, JoinHandle<Result<(), PipelineError>>) {
        let (tx, mut rx) = mpsc::channel::<String>(buffer.max(1));

        let written_lines = Arc::new(AtomicU64::new(0));
        let written_lines_bg = Arc::clone(&written_lines);

        let handle = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                if let Err(e) = sink.send(&chunk).await {
                    warn!(error = %e, "output sink rejected a line, stopping");
                    return Err(PipelineError::Sink(e));
                }
                written_lines_bg.fetch_add(1, Ordering::Relaxed);
            }
            sink.flush().await.map_err(PipelineError::Sink)
        });

        (Self {
            sender: tx,
            prettifier,
            total_lines: Arc::new(AtomicU64::new(0)),
            structured_lines: Arc::new(AtomicU64::new(0)),
            opaque_lines: Arc::new(AtomicU64::new(0)),
            written_lines,
        }, handle)
    }

    /// Format one line (without its terminator) and queue the result.
    pub async fn push(&self, line: &str) -> Result<(), PipelineError> {
        self.total_lines.fetch_add(1, Ordering::Relaxed);

        let (kind, chunk) = self.prettifier.render_line(line);
        match kind {
            LineKind::Structured => self.structured_lines.fetch_add(1, Ordering::Relaxed),
            LineKind::Opaque => self.opaque_lines.fetch_add(1, Ordering::Relaxed),
        };

        self.sender
            .send(chunk)
            .await
            .map_err(|_| PipelineError::WriterClosed)
    }

    /// Read `\n`-delimited lines until EOF and push each one.
    ///
    /// A trailing `\r` is stripped, invalid UTF-8 is replaced lossily and a
    /// final line without terminator is still processed.
    pub async fn feed<R>(&self, reader: &mut R) -> Result<(), PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(());
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf);
            self.push(&line).await?;
        }
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            total: self.total_lines.load(Ordering::Relaxed),
            structured: self.structured_lines.load(Ordering::Relaxed),
            opaque: self.opaque_lines.load(Ordering::Relaxed),
            written: self.written_lines.load(Ordering::Relaxed),
        }
    }

    /// Close the channel, wait for the writer to drain and flush, and
    /// return the final counters.
    pub async fn finish(
        self,
        writer: JoinHandle<Result<(), PipelineError>>,
    ) -> Result<PipelineStats, PipelineError> {
        let mut stats = self.stats();
        let written = Arc::clone(&self.written_lines);
        // Dropping the only sender ends the writer loop.
        drop(self);

        writer.await??;
        stats.written = written.load(Ordering::Relaxed);
        Ok(stats)
    }
}

/// Run a whole stream through a fresh pipeline.
///
/// Sink failures take precedence over read failures, since a closed output
/// usually explains why the reader was cut short.
pub async fn run<R>(
    mut reader: R,
    sink: Arc<dyn LineSink>,
    prettifier: Prettifier,
    buffer: usize,
) -> Result<PipelineStats, PipelineError>
where
    R: AsyncBufRead + Unpin,
{
    let (pipeline, writer) = Pipeline::new(sink, prettifier, buffer);
    let fed = pipeline.feed(&mut reader).await;
    let finished = pipeline.finish(writer).await;

    match (fed, finished) {
        (_, Err(e)) => Err(e),
        (Err(e), Ok(_)) => Err(e),
        (Ok(()), Ok(stats)) => {
            debug!(
                total = stats.total,
                structured = stats.structured,
                opaque = stats.opaque,
                "input drained"
            );
            Ok(stats)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::style::StyleConfig;

    #[tokio::test]
    async fn preserves_order_and_counts() {
        let sink = Arc::new(MemorySink::new());
        let input: &[u8] = b"first\n{\"level\":30,\"time\":1,\"msg\":\"hi\"}\r\nlast";
        let stats = run(input, sink.clone(), Prettifier::new(StyleConfig::plain()), 1)
            .await
            .unwrap();

        assert_eq!(stats, PipelineStats { total: 3, structured: 1, opaque: 2, written: 3 });
        let chunks = sink.chunks().await;
        assert_eq!(chunks[0], "first\n");
        assert!(chunks[1].ends_with(" ✨ hi\n"));
        assert_eq!(chunks[2], "last\n");
    }

    #[tokio::test]
    async fn empty_lines_are_echoed() {
        let sink = Arc::new(MemorySink::new());
        let input: &[u8] = b"a\n\nb\n";
        run(input, sink.clone(), Prettifier::new(StyleConfig::plain()), 4)
            .await
            .unwrap();
        assert_eq!(sink.contents().await, "a\n\nb\n");
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let sink = Arc::new(MemorySink::new());
        let input: &[u8] = b"bad \xff byte\n";
        run(input, sink.clone(), Prettifier::new(StyleConfig::plain()), 4)
            .await
            .unwrap();
        assert_eq!(sink.contents().await, "bad \u{fffd} byte\n");
    }
}
