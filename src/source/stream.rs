//! Stream-based drip source.
//!
//! Receives drip events from an async byte stream. This is useful for a
//! sensor relay piped to stdin or connected over TCP.

use std::sync::Arc;

use dripwatch_sdk::{Clock, Timestamp};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::DripSource;

/// What the reader task reports back.
#[derive(Debug)]
enum StreamEvent {
    Drip(Timestamp),
    Failed(String),
}

/// A drip source that receives drip events from an async stream.
///
/// This source spawns a background task that reads lines from the provided
/// async reader. Every non-empty line that is not a `#` comment counts as one
/// drip, stamped with the clock at the moment the line arrives. The line's
/// content is not interpreted, so a relay can send anything from a bare
/// newline-terminated `1` to its own diagnostic payload.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use std::sync::Arc;
/// use dripwatch::StreamSource;
/// use dripwatch_sdk::SystemClock;
///
/// # tokio_test::block_on(async {
/// let data = b"drip\ndrip\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, Arc::new(SystemClock), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<StreamEvent>,
    description: String,
    last_error: Option<String>,
    closed: bool,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    pub fn spawn<R>(reader: R, clock: Arc<dyn Clock>, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    // EOF
                    Ok(0) => break,
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() || trimmed.starts_with('#') {
                            continue;
                        }
                        // Stamp before queueing so backpressure never delays the time
                        let now = clock.now();
                        if tx.send(StreamEvent::Drip(now)).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Failed(format!("Read error: {}", e))).await;
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error: None,
            closed: false,
        }
    }
}

impl DripSource for StreamSource {
    fn poll(&mut self) -> Vec<Timestamp> {
        let mut drips = Vec::new();

        // Drain without blocking
        loop {
            match self.receiver.try_recv() {
                Ok(StreamEvent::Drip(at)) => drips.push(at),
                Ok(StreamEvent::Failed(message)) => self.last_error = Some(message),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        drips
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
