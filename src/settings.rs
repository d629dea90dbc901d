//! Layered host settings.
//!
//! Values come from, in increasing precedence:
//! 1. Built-in defaults
//! 2. A TOML file (`dripwatch.toml` in the working directory, or `--config`)
//! 3. `DRIPWATCH_` environment variables, with `__` between section and key
//!    (e.g. `DRIPWATCH_INFUSION__VOLUME_ML=250`)
//! 4. Command-line flags, applied by the binary
//!
//! ```toml
//! [infusion]
//! volume_ml = 500.0
//! dripping_factor = 20.0
//!
//! [report]
//! interval = "1s"
//! status_file = "status.json"
//!
//! [log]
//! level = "info"
//! json = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use dripwatch_sdk::{Calibration, DEFAULT_DRIPPING_FACTOR, DEFAULT_TOTAL_VOLUME_ML};
use serde::Deserialize;

use crate::duration::parse_duration;

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_NAME: &str = "dripwatch";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DRIPWATCH";

/// Complete host settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub infusion: InfusionSettings,
    pub report: ReportSettings,
    pub log: LogSettings,
}

/// The bag and giving set being monitored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InfusionSettings {
    pub volume_ml: f64,
    pub dripping_factor: f64,
}

impl Default for InfusionSettings {
    fn default() -> Self {
        Self {
            volume_ml: DEFAULT_TOTAL_VOLUME_ML,
            dripping_factor: DEFAULT_DRIPPING_FACTOR,
        }
    }
}

/// How often status is reported, and where.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Duration string such as `"1s"` or `"500ms"`
    pub interval: String,
    /// Rewritten with the status JSON on every report
    pub status_file: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            interval: "1s".to_string(),
            status_file: None,
        }
    }
}

/// Log output. `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from the process environment and either `path` or the
    /// optional default settings file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Load settings with an explicit environment instead of the process one.
    pub fn load_from(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let file = match path {
            // An explicit file must exist
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        Ok(settings)
    }

    /// The validated calibration for the configured infusion.
    pub fn calibration(&self) -> Result<Calibration> {
        Ok(Calibration::new(
            self.infusion.volume_ml,
            self.infusion.dripping_factor,
        )?)
    }

    /// The report interval; zero is rejected.
    pub fn report_interval(&self) -> Result<Duration> {
        let interval = parse_duration(&self.report.interval)
            .with_context(|| format!("Invalid report interval: {}", self.report.interval))?;
        if interval.is_zero() {
            bail!("Report interval must be greater than zero");
        }
        Ok(interval)
    }
}
