//! # dripwatch-sdk
//!
//! Drip-rate engine for IV infusion monitoring.
//!
//! A sensor relay reports one event per detected drop; this crate turns that
//! stream of timestamps into infused volume, completion percentage, flow rate
//! and an estimate of the time remaining.
//!
//! ## Quick Start
//!
//! ```rust
//! use dripwatch_sdk::{Calibration, Session};
//! use dripwatch_types::Timestamp;
//!
//! // 500 ml bag on a 20 drops/ml giving set
//! let session = Session::new();
//! session.configure_with(500.0, 20.0).unwrap();
//!
//! // The sensor host records drips with its own clock
//! for s in 0..=10 {
//!     session.record_drip(Timestamp::from_secs(s * 2)).unwrap();
//! }
//!
//! // A poller asks for status at its own cadence
//! let status = session.status(Timestamp::from_secs(20));
//! let stats = status.stats().unwrap();
//! assert_eq!(stats.total_drips, 11);
//! assert_eq!(stats.drips_per_minute, 30.0);
//! assert_eq!(stats.ml_per_minute, 1.5);
//! ```
//!
//! ## Features
//!
//! - **Moving window rate**: flow averaged over the last ten drips
//! - **Caller-supplied time**: every operation takes a [`Timestamp`](dripwatch_types::Timestamp)
//! - **Thread-safe sessions**: one lock around the monitor, atomic reconfiguration
//! - **Background reporting**: periodic status to file, TCP or channel (`tokio` feature)

mod calibration;
mod clock;
mod error;
mod monitor;
mod output;
mod reporter;
mod session;
mod window;

pub use calibration::{Calibration, DEFAULT_DRIPPING_FACTOR, DEFAULT_TOTAL_VOLUME_ML};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::MonitorError;
pub use monitor::{DripMonitor, Phase};
pub use output::Output;
pub use reporter::{Reporter, ReporterBuilder};
pub use session::Session;
pub use window::{DripWindow, WINDOW_CAPACITY};

#[cfg(feature = "tokio")]
pub use reporter::EmissionHandle;

// Re-export types for convenience
pub use dripwatch_types::{DripStats, Status, Timestamp};
