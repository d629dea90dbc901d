//! Calibration parameters for an infusion.

use crate::error::MonitorError;

/// Target volume used by hosts when none is supplied.
pub const DEFAULT_TOTAL_VOLUME_ML: f64 = 500.0;

/// Drops per millilitre used by hosts when none is supplied.
pub const DEFAULT_DRIPPING_FACTOR: f64 = 20.0;

/// Immutable calibration of one infusion: how much to deliver and how many
/// drops make up a millilitre on this IV set.
///
/// A `Calibration` can only be built from positive finite values, so every
/// monitor created from one is valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    total_volume_ml: f64,
    dripping_factor: f64,
}

impl Calibration {
    /// Validate and build a calibration.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidConfiguration`] if either value is zero,
    /// negative, NaN or infinite. The volume is checked first.
    pub fn new(total_volume_ml: f64, dripping_factor: f64) -> Result<Self, MonitorError> {
        check_positive("total_volume_ml", total_volume_ml)?;
        check_positive("dripping_factor", dripping_factor)?;
        Ok(Self {
            total_volume_ml,
            dripping_factor,
        })
    }

    /// Target volume to infuse, in millilitres.
    pub fn total_volume_ml(&self) -> f64 {
        self.total_volume_ml
    }

    /// Drops per millilitre.
    pub fn dripping_factor(&self) -> f64 {
        self.dripping_factor
    }

    /// Millilitres represented by `drips` drops.
    pub fn volume_of(&self, drips: u64) -> f64 {
        drips as f64 / self.dripping_factor
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            total_volume_ml: DEFAULT_TOTAL_VOLUME_ML,
            dripping_factor: DEFAULT_DRIPPING_FACTOR,
        }
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), MonitorError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MonitorError::InvalidConfiguration { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_values() {
        let calibration = Calibration::new(250.0, 15.0).unwrap();
        assert_eq!(calibration.total_volume_ml(), 250.0);
        assert_eq!(calibration.dripping_factor(), 15.0);
    }

    #[test]
    fn default_is_500ml_at_20_drops() {
        let calibration = Calibration::default();
        assert_eq!(calibration.total_volume_ml(), 500.0);
        assert_eq!(calibration.dripping_factor(), 20.0);
    }

    #[test]
    fn rejects_non_positive_volume() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Calibration::new(bad, 20.0).unwrap_err();
            match err {
                MonitorError::InvalidConfiguration { field, .. } => {
                    assert_eq!(field, "total_volume_ml")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_positive_factor() {
        let err = Calibration::new(500.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            MonitorError::InvalidConfiguration {
                field: "dripping_factor",
                value: 0.0
            }
        );
        assert!(Calibration::new(500.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn error_message_names_field() {
        let err = Calibration::new(-5.0, 20.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: total_volume_ml must be a positive number, got -5"
        );
    }

    #[test]
    fn volume_of_uses_factor() {
        let calibration = Calibration::default();
        assert_eq!(calibration.volume_of(100), 5.0);
        assert_eq!(calibration.volume_of(0), 0.0);
    }
}
