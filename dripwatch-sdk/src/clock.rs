//! Time sources for hosts.
//!
//! The monitor never reads a clock; hosts capture a timestamp with a
//! [`Clock`] and pass it in.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dripwatch_types::Timestamp;

/// Something that can say what time it is.
pub trait Clock: Send + Sync + Debug {
    /// The current time.
    fn now(&self) -> Timestamp;
}

/// Wall clock, in microseconds since the Unix epoch.
///
/// Wall time can step backwards (NTP, manual changes). The monitor clamps
/// such drips rather than rejecting them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Timestamp::from)
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test (or a replay) can hand one clone
/// to a reporter and advance another.
///
/// ```rust
/// use dripwatch_sdk::{Clock, ManualClock};
/// use dripwatch_types::Timestamp;
/// use std::time::Duration;
///
/// let clock = ManualClock::new(Timestamp::from_secs(10));
/// let shared = clock.clone();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(shared.now(), Timestamp::from_secs(15));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(start.as_micros())),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: Timestamp) {
        self.micros.store(at.as_micros(), Ordering::Relaxed);
    }

    /// Move forward by `by`.
    ///
    /// Saturates at the largest representable time instead of wrapping.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        let _ = self
            .micros
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |micros| {
                Some(micros.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Relaxed))
    }
}
