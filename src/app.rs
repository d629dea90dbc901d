//! Host state: a drip source wired to a session.

use dripwatch_sdk::{MonitorError, Session, Status, Timestamp};
use tracing::{debug, info, warn};

use crate::source::DripSource;

/// Main host state.
///
/// Owns a drip source and records whatever it produces on a shared
/// [`Session`]. The status side lives elsewhere (a reporter, or whoever holds
/// another clone of the session), so this type only moves drips.
#[derive(Debug)]
pub struct App {
    session: Session,
    source: Box<dyn DripSource>,
    recorded: u64,
    rejected: u64,
    pub load_error: Option<String>,
}

impl App {
    /// Create a new App feeding `session` from `source`.
    pub fn new(session: Session, source: Box<dyn DripSource>) -> Self {
        Self {
            session,
            source,
            recorded: 0,
            rejected: 0,
            load_error: None,
        }
    }

    /// Returns a description of the current drip source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The session drips are recorded on.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drips recorded since the app started.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Drips dropped because no infusion was configured.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Whether the source has ended for good.
    pub fn source_closed(&self) -> bool {
        self.source.is_closed()
    }

    /// Poll the source and record every new drip.
    ///
    /// Returns the number of drips recorded by this call.
    pub fn pump(&mut self) -> usize {
        let drips = self.source.poll();

        let mut recorded = 0;
        for drip in drips {
            match self.session.record_drip(drip) {
                Ok(total) => {
                    recorded += 1;
                    debug!(total_drips = total, at = drip.as_secs_f64(), "Drip recorded");
                }
                Err(MonitorError::NotConfigured) => self.rejected += 1,
                Err(e) => warn!(error = %e, "Drip not recorded"),
            }
        }
        self.recorded += recorded as u64;

        let error = self.source.error().map(str::to_string);
        if error != self.load_error {
            if let Some(ref message) = error {
                warn!(source = %self.source.description(), error = %message, "Drip source error");
            }
            self.load_error = error;
        }

        recorded
    }
}

/// Record a batch of drips, in order, on `session`.
///
/// Returns the session's drip count after the last one.
///
/// # Errors
///
/// Returns [`MonitorError::NotConfigured`] if the session has no infusion.
pub fn replay(session: &Session, drips: &[Timestamp]) -> Result<u64, MonitorError> {
    if !session.is_configured() {
        return Err(MonitorError::NotConfigured);
    }

    let mut total = 0;
    for &drip in drips {
        total = session.record_drip(drip)?;
    }
    Ok(total)
}

/// Emit one human-readable log event for a status.
pub fn log_status(status: &Status) {
    match status {
        Status::NotConfigured => info!("No infusion configured"),
        Status::Waiting => info!("Waiting for first drip"),
        Status::Active(stats) => {
            if stats.is_complete() {
                info!(total_drips = stats.total_drips, "Infusion complete");
            }
            info!(
                total_drips = stats.total_drips,
                infused_ml = stats.infused_volume_ml,
                percentage = stats.percentage,
                drips_per_minute = stats.drips_per_minute,
                ml_per_minute = stats.ml_per_minute,
                remaining_minutes = stats.remaining_time_minutes,
                "Infusion status"
            );
        }
    }
}
