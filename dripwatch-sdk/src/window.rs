//! Moving window of recent drip timestamps for flow-rate estimation.

use std::collections::VecDeque;

use dripwatch_types::Timestamp;

/// Number of most recent drips the flow rate is averaged over.
pub const WINDOW_CAPACITY: usize = 10;

/// FIFO ring of the most recent drip timestamps, oldest first.
///
/// The flow rate is averaged over the whole window rather than taken
/// from the last interval alone, which smooths sensor jitter between
/// individual drops while still following rate changes within a few drops.
#[derive(Debug, Clone, Default)]
pub struct DripWindow {
    samples: VecDeque<Timestamp>,
}

impl DripWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Append a timestamp, evicting the oldest one if the window is full.
    pub fn push(&mut self, at: Timestamp) {
        if self.samples.len() == WINDOW_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(at);
    }

    /// Number of timestamps held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest timestamp in the window.
    pub fn first(&self) -> Option<Timestamp> {
        self.samples.front().copied()
    }

    /// Newest timestamp in the window.
    pub fn last(&self) -> Option<Timestamp> {
        self.samples.back().copied()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().copied()
    }

    /// Average flow rate over the window, in drips per minute.
    ///
    /// Zero with fewer than two samples, or when the window spans no time
    /// (every sample shares one timestamp).
    pub fn drips_per_minute(&self) -> f64 {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return 0.0;
        };
        let intervals = self.samples.len().saturating_sub(1);
        if intervals == 0 {
            return 0.0;
        }

        let span = last.saturating_since(first).as_secs_f64();
        if span <= 0.0 {
            return 0.0;
        }

        let seconds_per_drip = span / intervals as f64;
        60.0 / seconds_per_drip
    }
}
