//! The drip monitor: state accumulation and derived statistics.

use dripwatch_types::{DripStats, Timestamp};
use tracing::{debug, warn};

use crate::calibration::Calibration;
use crate::error::MonitorError;
use crate::window::DripWindow;

/// Where an infusion is in its lifecycle.
///
/// Start and last drip times only exist once a drip has been recorded,
/// so they live inside the `Active` variant instead of as two
/// independent options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No drip recorded yet.
    Unstarted,
    /// At least one drip recorded.
    Active {
        /// Time of the first drip.
        started: Timestamp,
        /// Time of the most recent drip.
        last: Timestamp,
    },
}

/// Rate-calculation engine for a single infusion.
///
/// The monitor is a plain single-owner value: `record_drip` takes
/// `&mut self` and `stats` takes `&self`. Share it between a producer and a
/// consumer through a [`Session`](crate::Session), which puts it behind one
/// lock.
///
/// Time is always supplied by the caller, so the monitor is a deterministic
/// function of its calibration, the recorded timestamps and `now`.
///
/// # Example
///
/// ```rust
/// use dripwatch_sdk::DripMonitor;
/// use dripwatch_types::Timestamp;
///
/// let mut monitor = DripMonitor::configure(500.0, 20.0).unwrap();
/// assert!(monitor.stats(Timestamp::ZERO).is_none());
///
/// for s in 0..4 {
///     monitor.record_drip(Timestamp::from_secs(s * 3));
/// }
///
/// let stats = monitor.stats(Timestamp::from_secs(60)).unwrap();
/// assert_eq!(stats.total_drips, 4);
/// assert_eq!(stats.drips_per_minute, 20.0);
/// assert_eq!(stats.time_elapsed_minutes, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DripMonitor {
    calibration: Calibration,
    total_drips: u64,
    phase: Phase,
    window: DripWindow,
}

impl DripMonitor {
    /// Create a fresh monitor with zeroed counters.
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration,
            total_drips: 0,
            phase: Phase::Unstarted,
            window: DripWindow::new(),
        }
    }

    /// Validate raw calibration values and create a monitor.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidConfiguration`] if either value is not a
    /// positive finite number. No monitor is created in that case.
    pub fn configure(total_volume_ml: f64, dripping_factor: f64) -> Result<Self, MonitorError> {
        Calibration::new(total_volume_ml, dripping_factor).map(Self::new)
    }

    /// Record one drip observed at `now` and return the new drip count.
    ///
    /// A timestamp earlier than the previous drip is clamped to the previous
    /// drip time: the drop is still counted, but the window stays ordered.
    pub fn record_drip(&mut self, now: Timestamp) -> u64 {
        let at = match self.phase {
            Phase::Unstarted => {
                debug!(at = now.as_micros(), "First drip, infusion started");
                self.phase = Phase::Active {
                    started: now,
                    last: now,
                };
                now
            }
            Phase::Active { started, last } => {
                let at = if now < last {
                    warn!(
                        at = now.as_micros(),
                        last = last.as_micros(),
                        "Drip timestamp went backwards, clamping to previous drip"
                    );
                    last
                } else {
                    now
                };
                self.phase = Phase::Active { started, last: at };
                at
            }
        };

        self.total_drips += 1;
        self.window.push(at);
        self.total_drips
    }

    /// Derive flow statistics as of `now`.
    ///
    /// Returns `None` until the first drip has been recorded. Calling this
    /// repeatedly with the same `now` and no drips in between returns
    /// identical results.
    pub fn stats(&self, now: Timestamp) -> Option<DripStats> {
        let Phase::Active { started, .. } = self.phase else {
            return None;
        };

        let total_volume_ml = self.calibration.total_volume_ml();
        let dripping_factor = self.calibration.dripping_factor();

        let infused_volume_ml = self.calibration.volume_of(self.total_drips);
        let percentage = infused_volume_ml / total_volume_ml * 100.0;
        let remaining_volume_ml = total_volume_ml - infused_volume_ml;

        let drips_per_minute = self.window.drips_per_minute();
        let ml_per_minute = drips_per_minute / dripping_factor;
        let remaining_time_minutes = if ml_per_minute > 0.0 {
            remaining_volume_ml / ml_per_minute
        } else {
            0.0
        };

        let time_elapsed_minutes = now.saturating_since(started).as_secs_f64() / 60.0;

        Some(DripStats {
            total_drips: self.total_drips,
            infused_volume_ml: round_to(infused_volume_ml, 2),
            remaining_volume_ml: round_to(remaining_volume_ml, 2),
            percentage: round_to(percentage, 1),
            drips_per_minute: round_to(drips_per_minute, 1),
            ml_per_minute: round_to(ml_per_minute, 2),
            remaining_time_minutes: round_to(remaining_time_minutes, 1),
            time_elapsed_minutes: round_to(time_elapsed_minutes, 1),
        })
    }

    /// The calibration this monitor was created with.
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Number of drips recorded.
    pub fn total_drips(&self) -> u64 {
        self.total_drips
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Time of the first drip, if any.
    pub fn infusion_start(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Active { started, .. } => Some(started),
            Phase::Unstarted => None,
        }
    }

    /// Time of the most recent drip, if any.
    pub fn last_drip_time(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Active { last, .. } => Some(last),
            Phase::Unstarted => None,
        }
    }

    /// The recent-drip window used for the flow rate.
    pub fn window(&self) -> &DripWindow {
        &self.window
    }
}

/// Round to `places` decimal places.
///
/// Goes through the decimal formatter, which rounds the exact binary value
/// and breaks ties to even, so 0.15 (stored just below) gives 0.1 and a
/// value such as 0.44999999999999996 is not pushed up to 0.5 by scaling.
/// Negative zero comes out as zero.
fn round_to(value: f64, places: usize) -> f64 {
    // Formatting a finite f64 always parses back; fall back to the input
    // rather than panic if that ever changes.
    let rounded = format!("{:.*}", places, value)
        .parse::<f64>()
        .unwrap_or(value);
    rounded + 0.0
}
