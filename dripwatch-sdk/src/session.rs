//! Session handle shared between a drip producer and a status consumer.

use std::sync::Arc;

use dripwatch_types::{Status, Timestamp};
use parking_lot::Mutex;
use tracing::debug;

use crate::calibration::Calibration;
use crate::error::MonitorError;
use crate::monitor::DripMonitor;

/// A handle to the infusion currently being monitored, if any.
///
/// This is the primary interface for hosts. Clone it freely: every clone
/// refers to the same session. The monitor lives behind a single mutex, and
/// every operation takes that lock exactly once, so a status query never
/// sees a half-recorded drip and a reconfiguration replaces the monitor in
/// one step.
///
/// # Example
///
/// ```rust
/// use dripwatch_sdk::{Calibration, Session};
/// use dripwatch_types::{Status, Timestamp};
///
/// let session = Session::new();
/// assert_eq!(session.status(Timestamp::ZERO), Status::NotConfigured);
///
/// session.configure(Calibration::default());
/// assert_eq!(session.status(Timestamp::ZERO), Status::Waiting);
///
/// session.record_drip(Timestamp::from_secs(1)).unwrap();
/// session.record_drip(Timestamp::from_secs(4)).unwrap();
///
/// let status = session.status(Timestamp::from_secs(4));
/// assert_eq!(status.stats().unwrap().drips_per_minute, 20.0);
///
/// // Reset discards the infusion
/// assert!(session.reset());
/// assert_eq!(session.status(Timestamp::ZERO), Status::NotConfigured);
/// ```
#[derive(Clone, Default)]
pub struct Session {
    monitor: Arc<Mutex<Option<DripMonitor>>>,
}

impl Session {
    /// Create an unconfigured session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already monitoring `calibration`.
    pub fn with_calibration(calibration: Calibration) -> Self {
        let session = Self::new();
        session.configure(calibration);
        session
    }

    /// Start a fresh infusion, replacing any current one.
    pub fn configure(&self, calibration: Calibration) {
        let fresh = DripMonitor::new(calibration);
        let previous = self.monitor.lock().replace(fresh);
        debug!(
            total_volume_ml = calibration.total_volume_ml(),
            dripping_factor = calibration.dripping_factor(),
            replaced = previous.is_some(),
            "Infusion configured"
        );
    }

    /// Validate raw values and start a fresh infusion.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidConfiguration`] without touching the
    /// current infusion if either value is not a positive finite number.
    pub fn configure_with(
        &self,
        total_volume_ml: f64,
        dripping_factor: f64,
    ) -> Result<(), MonitorError> {
        let calibration = Calibration::new(total_volume_ml, dripping_factor)?;
        self.configure(calibration);
        Ok(())
    }

    /// Record one drip observed at `now` and return the new drip count.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NotConfigured`] if no infusion is configured.
    /// The drip is dropped in that case.
    pub fn record_drip(&self, now: Timestamp) -> Result<u64, MonitorError> {
        self.monitor
            .lock()
            .as_mut()
            .map(|monitor| monitor.record_drip(now))
            .ok_or(MonitorError::NotConfigured)
    }

    /// Current status as of `now`.
    pub fn status(&self, now: Timestamp) -> Status {
        match self.monitor.lock().as_ref() {
            Some(monitor) => Status::from(monitor.stats(now)),
            None => Status::NotConfigured,
        }
    }

    /// Discard the current infusion.
    ///
    /// Returns `true` if an infusion was configured.
    pub fn reset(&self) -> bool {
        let previous = self.monitor.lock().take();
        if let Some(monitor) = &previous {
            debug!(total_drips = monitor.total_drips(), "Infusion reset");
        }
        previous.is_some()
    }

    /// Whether an infusion is configured.
    pub fn is_configured(&self) -> bool {
        self.monitor.lock().is_some()
    }

    /// Calibration of the current infusion, if any.
    pub fn calibration(&self) -> Option<Calibration> {
        self.monitor.lock().as_ref().map(DripMonitor::calibration)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("configured", &self.is_configured())
            .finish()
    }
}
