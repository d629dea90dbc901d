//! # dripwatch-types
//!
//! Core types for IV drip monitoring. This crate defines the values that flow
//! between a drip sensor host, the rate-calculation engine in `dripwatch-sdk`
//! and whatever consumes the resulting status (a dashboard, a log, a file).
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON and friends
//! - **Caller-owned time**: [`Timestamp`] is a plain value, never read from a clock here
//! - **Flat status shape**: [`Status`] serializes to a single flat mapping
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use dripwatch_types::{DripStats, Status, Timestamp};
//!
//! let stats = DripStats {
//!     total_drips: 100,
//!     infused_volume_ml: 5.0,
//!     remaining_volume_ml: 495.0,
//!     percentage: 1.0,
//!     drips_per_minute: 60.0,
//!     ml_per_minute: 3.0,
//!     remaining_time_minutes: 165.0,
//!     time_elapsed_minutes: 1.7,
//! };
//!
//! let status = Status::Active(stats);
//! assert!(status.is_configured());
//! assert_eq!(status.stats().map(|s| s.total_drips), Some(100));
//!
//! let t = Timestamp::from_secs(90);
//! assert_eq!(t.saturating_since(Timestamp::from_secs(30)).as_secs(), 60);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod stats;
mod status;
mod timestamp;

pub use stats::*;
pub use status::*;
pub use timestamp::*;
