//! Derived flow statistics for an infusion.

/// Flow statistics derived from the drips recorded so far.
///
/// All floating point fields are already rounded for display by the
/// engine that produced them: volumes and `ml_per_minute` to two decimal
/// places, everything else to one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DripStats {
    /// Number of drips recorded since the session started.
    pub total_drips: u64,

    /// Volume delivered so far, in millilitres.
    pub infused_volume_ml: f64,

    /// Volume still to be delivered, in millilitres.
    ///
    /// Negative when more drips were recorded than the target volume
    /// implies (over-infusion). This is never clamped.
    pub remaining_volume_ml: f64,

    /// Completion as a percentage of the target volume.
    pub percentage: f64,

    /// Current flow rate averaged over the most recent drips.
    pub drips_per_minute: f64,

    /// Current flow rate converted to millilitres per minute.
    pub ml_per_minute: f64,

    /// Estimated minutes until the target volume is reached.
    ///
    /// Zero when there is no measurable flow.
    pub remaining_time_minutes: f64,

    /// Minutes since the first recorded drip.
    pub time_elapsed_minutes: f64,
}

impl DripStats {
    /// Whether the recorded volume has reached or passed the target.
    pub fn is_complete(&self) -> bool {
        self.remaining_volume_ml <= 0.0
    }

    /// Whether a flow rate could be measured.
    pub fn has_flow(&self) -> bool {
        self.drips_per_minute > 0.0
    }
}
