//! Channel-based drip source.
//!
//! Receives drip timestamps via a tokio mpsc channel. This is useful when the
//! sensor driver lives in the same process and pushes drips as they happen.

use dripwatch_sdk::Timestamp;
use tokio::sync::mpsc;

use super::DripSource;

/// A drip source that receives timestamps via a channel.
///
/// The producer (for example a GPIO interrupt handler) stamps each drip with
/// its own clock and sends it through the channel; this source hands the
/// queued drips over on every poll.
///
/// # Example
///
/// ```
/// use dripwatch::{ChannelSource, DripSource};
/// use dripwatch_sdk::Timestamp;
///
/// let (tx, mut source) = ChannelSource::create("gpio17", 64);
/// tx.try_send(Timestamp::from_secs(1)).unwrap();
/// assert_eq!(source.poll(), vec![Timestamp::from_secs(1)]);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Timestamp>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an mpsc channel
    /// * `source_description` - A description of where drips come from
    ///   (e.g., "gpio17", "relay-ward-3")
    pub fn new(receiver: mpsc::Receiver<Timestamp>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            closed: false,
        }
    }

    /// Create a channel pair for sending drips to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender can be used to push drip
    /// timestamps and the source can be polled by the host.
    pub fn create(source_description: &str, buffer: usize) -> (mpsc::Sender<Timestamp>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DripSource for ChannelSource {
    fn poll(&mut self) -> Vec<Timestamp> {
        let mut drips = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(drip) => drips.push(drip),
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
        // Producer failures belong to the producer
        None
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test", 16);
        assert_eq!(source.description(), "channel: test");

        // Nothing sent yet
        assert!(source.poll().is_empty());

        tx.try_send(Timestamp::from_secs(1)).unwrap();
        tx.try_send(Timestamp::from_secs(2)).unwrap();

        // Both drips arrive in order
        assert_eq!(
            source.poll(),
            vec![Timestamp::from_secs(1), Timestamp::from_secs(2)]
        );
        assert!(source.poll().is_empty());
        assert!(!source.is_closed());
    }

    #[test]
    fn test_channel_source_drains_before_closing() {
        let (tx, mut source) = ChannelSource::create("test", 16);
        tx.try_send(Timestamp::from_secs(5)).unwrap();
        drop(tx);

        assert_eq!(source.poll(), vec![Timestamp::from_secs(5)]);
        assert!(source.is_closed());
        assert!(source.error().is_none());
    }
}
