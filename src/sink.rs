use async_trait::async_trait;
use std::error::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Asynchronous destination for formatted output chunks.
///
/// The pipeline calls `send` from its writer task, strictly in input
/// order, once per input line.
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Write one newline-terminated chunk.
    ///
    /// **Returns**
    /// - `Ok(())` once the chunk was accepted.
    /// - `Err(..)` if the destination failed (closed pipe, I/O error). The
    ///   pipeline stops on the first error.
    async fn send(&self, chunk: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush anything buffered. Called once after the input is exhausted.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Sink over any tokio writer, typically `tokio::io::stdout()`.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> LineSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, chunk: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.write_all(chunk.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Collects every chunk in memory. Handy for embedding and tests.
#[derive(Default)]
pub struct MemorySink {
    chunks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn chunks(&self) -> Vec<String> {
        self.chunks.lock().await.clone()
    }

    /// All chunks concatenated, as they would appear on a terminal.
    pub async fn contents(&self) -> String {
        self.chunks.lock().await.concat()
    }
}

#[async_trait]
impl LineSink for MemorySink {
    async fn send(&self, chunk: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.chunks.lock().await.push(chunk.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writer_sink_writes_bytes_in_order() {
        let sink = WriterSink::new(Vec::<u8>::new());
        sink.send("a\n").await.unwrap();
        sink.send("b\n").await.unwrap();
        sink.flush().await.unwrap();
        assert_eq!(sink.into_inner(), b"a\nb\n");
    }

    #[tokio::test]
    async fn memory_sink_keeps_chunks() {
        let sink = MemorySink::new();
        sink.send("one\n").await.unwrap();
        sink.send("two\n").await.unwrap();
        assert_eq!(sink.chunks().await, vec!["one\n", "two\n"]);
        assert_eq!(sink.contents().await, "one\ntwo\n");
    }
}
