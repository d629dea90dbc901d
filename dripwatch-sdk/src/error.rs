//! Error types for the drip engine.

use thiserror::Error;

/// Errors surfaced by the engine and the session handle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// A calibration parameter is not a positive finite number.
    #[error("Invalid configuration: {field} must be a positive number, got {value}")]
    InvalidConfiguration {
        /// Name of the rejected parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An event arrived before any infusion was configured.
    #[error("No infusion configured")]
    NotConfigured,
}

impl MonitorError {
    /// Whether this is the normal "nothing configured yet" state rather than a fault.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, MonitorError::NotConfigured)
    }
}
