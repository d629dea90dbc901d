//! Drip source abstraction for feeding a session.
//!
//! This module provides a trait-based abstraction for receiving drip events
//! from various sources (an append-only log file, a byte stream such as stdin
//! or a socket, or an in-process channel).

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::{load_drip_log, FileSource};
pub use stream::StreamSource;

use std::fmt::Debug;

use anyhow::{anyhow, Context, Result};
use dripwatch_sdk::Timestamp;

/// Trait for receiving drip events from various sources.
///
/// Implementations of this trait observe drips from different backends and
/// hand them over in arrival order. The host records each one on its
/// [`Session`](dripwatch_sdk::Session).
///
/// # Example
///
/// ```
/// use dripwatch::{DripSource, FileSource};
///
/// let mut source = FileSource::new("drips.log");
/// for drip in source.poll() {
///     println!("drip at {:.3}s", drip.as_secs_f64());
/// }
/// ```
pub trait DripSource: Send + Debug {
    /// Drips observed since the last poll, oldest first.
    ///
    /// Returns an empty vector if nothing new arrived. This method should be
    /// non-blocking.
    fn poll(&mut self) -> Vec<Timestamp>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log messages.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;

    /// Whether the source has ended and will never produce another drip.
    ///
    /// Files can always grow, so only finite streams ever report `true`.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Parse one line of a drip log.
///
/// A line holds a single timestamp in (fractional) seconds. Blank lines and
/// lines starting with `#` carry no drip and yield `Ok(None)`.
pub fn parse_drip_line(line: &str) -> Result<Option<Timestamp>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let secs: f64 = line
        .parse()
        .with_context(|| format!("not a number: {:?}", line))?;
    Timestamp::from_secs_f64(secs)
        .map(Some)
        .ok_or_else(|| anyhow!("not a valid drip time: {}", line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional_seconds() {
        assert_eq!(
            parse_drip_line("12").unwrap(),
            Some(Timestamp::from_secs(12))
        );
        assert_eq!(
            parse_drip_line("  1.25\n").unwrap(),
            Some(Timestamp::from_millis(1250))
        );
    }

    #[test]
    fn blank_and_comment_lines_carry_no_drip() {
        assert_eq!(parse_drip_line("").unwrap(), None);
        assert_eq!(parse_drip_line("   ").unwrap(), None);
        assert_eq!(parse_drip_line("# started 09:14").unwrap(), None);
    }

    #[test]
    fn reject_garbage_and_negative_times() {
        let err = parse_drip_line("drip").unwrap_err();
        assert!(err.to_string().contains("not a number"));

        let err = parse_drip_line("-3.0").unwrap_err();
        assert!(err.to_string().contains("not a valid drip time"));

        assert!(parse_drip_line("NaN").is_err());
        assert!(parse_drip_line("inf").is_err());
    }
}
