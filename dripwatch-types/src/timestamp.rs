//! Point-in-time representation for drip events.
//!
//! We use microseconds as the canonical unit so that differences between
//! drips are exact integer arithmetic, independent of float rounding.

use core::ops::Add;
use core::time::Duration;

/// A point in time, in microseconds since an epoch chosen by the clock.
///
/// The epoch is whatever the producing clock uses (Unix time for a wall
/// clock, sensor uptime for a relay, zero for a manual clock). Only
/// differences between timestamps from the same clock are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The epoch itself.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create from microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1000)
    }

    /// Create from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000)
    }

    /// Create from fractional seconds.
    ///
    /// Returns `None` for negative, NaN or infinite input, or for values
    /// that do not fit in a `u64` of microseconds.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let micros = secs * 1_000_000.0;
        if micros >= u64::MAX as f64 {
            return None;
        }
        // Nearest microsecond; avoids 0.3s landing on 299_999us.
        Some(Self((micros + 0.5) as u64))
    }

    /// Get the value in microseconds.
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Get the value in milliseconds (truncated).
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1000
    }

    /// Get the value in fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub const fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(saturating_micros(rhs)))
    }
}

impl From<Duration> for Timestamp {
    /// Interpret a duration as an offset from the epoch.
    fn from(d: Duration) -> Self {
        Self(saturating_micros(d))
    }
}

/// Whole microseconds in `d`, capped at `u64::MAX`.
pub(crate) fn saturating_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
