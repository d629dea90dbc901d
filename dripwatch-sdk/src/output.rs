//! Output backends for emitting infusion status.

use std::path::PathBuf;

use dripwatch_types::Status;

/// Output destination for status reports.
///
/// Configure where the reporter should emit each status.
#[derive(Debug)]
pub enum Output {
    /// Write the status to a JSON file.
    ///
    /// The file is overwritten with each report, so a dashboard can poll it.
    File(PathBuf),

    /// Send the status to a TCP server.
    ///
    /// Each status is sent as a newline-delimited JSON message.
    Tcp(String),

    /// Send the status through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<Status>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dripwatch_sdk::Output;
    ///
    /// let output = Output::file("status.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dripwatch_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive reports
    /// // while let Some(status) = rx.recv().await {
    /// //     println!("configured: {}", status.is_configured());
    /// // }
    /// ```
    #[cfg(feature = "tokio")]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<Status>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Short label for log messages.
    pub fn describe(&self) -> String {
        match self {
            Output::File(path) => format!("file: {}", path.display()),
            Output::Tcp(addr) => format!("tcp: {}", addr),
            #[cfg(feature = "tokio")]
            Output::Channel(_) => "channel".to_string(),
        }
    }

    /// Emit a status to this output.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, status: &Status) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(status)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                use tokio::io::AsyncWriteExt;
                use tokio::net::TcpStream;

                let mut stream = TcpStream::connect(addr).await?;
                let mut json = serde_json::to_string(status)?;
                json.push('\n');
                stream.write_all(json.as_bytes()).await?;
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(*status);
            }
        }
        Ok(())
    }
}
