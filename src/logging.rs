//! Log subscriber setup for the binary.
//!
//! Logs go to stderr so stdout stays clean for status JSON.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::LogSettings;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set. Fails if the
/// filter does not parse or a subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let directives =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| settings.level.clone());
    let filter = parse_filter(&directives)?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.context("Failed to install log subscriber")
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter: {}", directives))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_target_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("warn,dripwatch_sdk=debug").is_ok());
    }

    #[test]
    fn rejects_bad_level() {
        let err = parse_filter("dripwatch=chatty").unwrap_err();
        assert!(err.to_string().contains("Invalid log filter"));
    }
}
