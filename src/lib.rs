//! # dripwatch
//!
//! Host for the drip-rate engine: turns a stream of drip events from a
//! sensor relay into infusion status reports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   drips   ┌─────────┐  record   ┌─────────────────┐
//! │   source    │──────────▶│   app   │──────────▶│ Session (sdk)   │
//! │ File|Stream │           │ (pump)  │           │  DripMonitor    │
//! │ |Channel    │           └─────────┘           └────────┬────────┘
//! └─────────────┘                                          │ status
//!                                                          ▼
//!                                            ┌──────────────────────────┐
//!                                            │ Reporter (sdk) → Outputs │
//!                                            └──────────────────────────┘
//! ```
//!
//! - **[`source`]**: drip source abstraction ([`DripSource`] trait) with
//!   implementations for tailing a log file, reading a byte stream and
//!   draining an in-process channel
//! - **[`app`]**: moves drips from a source onto a session
//! - **[`settings`]**: layered file and environment settings
//! - **[`logging`]**: tracing subscriber setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Evaluate a recorded drip log
//! dripwatch --volume 500 --factor 20 --replay drips.log
//!
//! # Follow a log a relay is appending to
//! dripwatch --follow /var/log/relay/drips.log --status-out status.json
//!
//! # One line on stdin per drip
//! relay-reader | dripwatch --stdin
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use dripwatch::{App, ChannelSource};
//! use dripwatch_sdk::{Calibration, Session, Timestamp};
//!
//! let session = Session::with_calibration(Calibration::default());
//! let (tx, source) = ChannelSource::create("gpio17", 64);
//! let mut app = App::new(session.clone(), Box::new(source));
//!
//! tx.try_send(Timestamp::from_secs(0)).unwrap();
//! tx.try_send(Timestamp::from_secs(3)).unwrap();
//! app.pump();
//!
//! let status = session.status(Timestamp::from_secs(3));
//! assert_eq!(status.stats().unwrap().drips_per_minute, 20.0);
//! ```

pub mod app;
pub mod duration;
pub mod logging;
pub mod settings;
pub mod source;

// Re-export main types for convenience
pub use app::{log_status, replay, App};
pub use duration::parse_duration;
pub use logging::init_logging;
pub use settings::{InfusionSettings, LogSettings, ReportSettings, Settings};
pub use source::{
    load_drip_log, parse_drip_line, ChannelSource, DripSource, FileSource, StreamSource,
};
