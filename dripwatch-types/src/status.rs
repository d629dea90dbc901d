//! Status - what a host reports when asked about the infusion.

use crate::DripStats;

/// The answer to a status query.
///
/// A host distinguishes three situations: nothing has been configured,
/// an infusion is configured but no drip has arrived yet, and an active
/// infusion with statistics.
///
/// With the `serde` feature, a status serializes to one flat mapping:
///
/// ```text
/// {"configured": false}
/// {"configured": true, "waiting": true}
/// {"configured": true, "total_drips": 12, "infused_volume_ml": 0.6, ...}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Status {
    /// No infusion has been configured (or it was reset).
    #[default]
    NotConfigured,

    /// An infusion is configured but no drip has been recorded.
    Waiting,

    /// At least one drip has been recorded.
    Active(DripStats),
}

impl Status {
    /// Whether an infusion is configured.
    pub fn is_configured(&self) -> bool {
        !matches!(self, Status::NotConfigured)
    }

    /// Whether the host is waiting for the first drip.
    pub fn is_waiting(&self) -> bool {
        matches!(self, Status::Waiting)
    }

    /// Statistics, if any drip has been recorded.
    pub fn stats(&self) -> Option<&DripStats> {
        match self {
            Status::Active(stats) => Some(stats),
            _ => None,
        }
    }
}

impl From<Option<DripStats>> for Status {
    /// Status of a configured infusion.
    fn from(stats: Option<DripStats>) -> Self {
        match stats {
            Some(stats) => Status::Active(stats),
            None => Status::Waiting,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct FlatStatus {
    configured: bool,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    waiting: bool,
    #[serde(flatten)]
    stats: Option<DripStats>,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlatStatus {
            configured: self.is_configured(),
            waiting: self.is_waiting(),
            stats: self.stats().copied(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Status {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flat = FlatStatus::deserialize(deserializer)?;
        Ok(match (flat.configured, flat.stats) {
            (false, _) => Status::NotConfigured,
            (true, Some(stats)) if !flat.waiting => Status::Active(stats),
            (true, _) => Status::Waiting,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> DripStats {
        DripStats {
            total_drips: 20,
            infused_volume_ml: 1.0,
            remaining_volume_ml: 499.0,
            percentage: 0.2,
            drips_per_minute: 30.0,
            ml_per_minute: 1.5,
            remaining_time_minutes: 332.7,
            time_elapsed_minutes: 0.6,
        }
    }

    #[test]
    fn default_is_not_configured() {
        let status = Status::default();
        assert!(!status.is_configured());
        assert!(!status.is_waiting());
        assert!(status.stats().is_none());
    }

    #[test]
    fn from_option_maps_to_configured_states() {
        assert_eq!(Status::from(None), Status::Waiting);

        let status = Status::from(Some(sample_stats()));
        assert!(status.is_configured());
        assert_eq!(status.stats().unwrap().total_drips, 20);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn not_configured_serializes_flag_only() {
        let json = serde_json::to_value(Status::NotConfigured).unwrap();
        assert_eq!(json, serde_json::json!({ "configured": false }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn waiting_serializes_waiting_flag() {
        let json = serde_json::to_value(Status::Waiting).unwrap();
        assert_eq!(json, serde_json::json!({ "configured": true, "waiting": true }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn active_serializes_flat_mapping() {
        let json = serde_json::to_value(Status::Active(sample_stats())).unwrap();
        let map = json.as_object().unwrap();

        assert_eq!(map["configured"], true);
        assert!(!map.contains_key("waiting"));
        assert_eq!(map["total_drips"], 20);
        assert_eq!(map["drips_per_minute"], 30.0);
        assert_eq!(map.len(), 9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_all_three_shapes() {
        let parsed: Status = serde_json::from_str(r#"{"configured": false}"#).unwrap();
        assert_eq!(parsed, Status::NotConfigured);

        let parsed: Status =
            serde_json::from_str(r#"{"configured": true, "waiting": true}"#).unwrap();
        assert_eq!(parsed, Status::Waiting);

        let json = serde_json::to_string(&Status::Active(sample_stats())).unwrap();
        let parsed: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Status::Active(sample_stats()));
    }
}
