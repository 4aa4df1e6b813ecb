//! Layered configuration.
//!
//! Values come from an optional TOML file, then environment variables
//! prefixed with `ENERGY_DASHBOARD__` (nested keys separated by `__`, e.g.
//! `ENERGY_DASHBOARD__TARIFF__RATE_PER_KWH=0.25`). Command-line flags are
//! applied on top by the binary.
//!
//! ```toml
//! [source]
//! file = "energy_data.json"
//! refresh = "1s"
//!
//! [tariff]
//! rate_per_kwh = 0.25
//! currency = "€"
//!
//! [limits]
//! current_warning = 25.0
//! current_critical = 32.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{Band, DashboardOptions, Limits, Tariff};

const ENV_PREFIX: &str = "ENERGY_DASHBOARD";

/// Where snapshots come from and how often the UI polls for them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub file: PathBuf,
    /// `host:port` of a newline-delimited JSON relay; takes precedence over `file`.
    pub connect: Option<String>,
    pub refresh: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("energy_data.json"),
            connect: None,
            refresh: "1s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub tariff: Option<Tariff>,
    pub limits: Limits,
}

impl Settings {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| match path {
                Some(path) => format!("Failed to load config from {}", path.display()),
                None => "Failed to load config from environment".to_string(),
            })?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would make the dashboard misleading.
    pub fn validate(&self) -> Result<()> {
        self.refresh_interval()?;

        if let Some(tariff) = &self.tariff {
            if !tariff.rate_per_kwh.is_finite() || tariff.rate_per_kwh <= 0.0 {
                bail!(
                    "tariff.rate_per_kwh must be positive, got {}",
                    tariff.rate_per_kwh
                );
            }
        }

        validate_band("limits.voltage", &self.limits.voltage)?;
        validate_band("limits.frequency", &self.limits.frequency)?;
        if self.limits.current_warning <= 0.0
            || self.limits.current_critical < self.limits.current_warning
        {
            bail!(
                "limits.current_warning ({}) must be positive and not above limits.current_critical ({})",
                self.limits.current_warning,
                self.limits.current_critical
            );
        }
        Ok(())
    }

    /// Poll interval for the snapshot source.
    pub fn refresh_interval(&self) -> Result<Duration> {
        let interval = parse_duration(&self.source.refresh)
            .with_context(|| format!("Invalid source.refresh {:?}", self.source.refresh))?;
        if interval.is_zero() {
            bail!("source.refresh must be greater than zero");
        }
        Ok(interval)
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            tariff: self.tariff.clone(),
            limits: self.limits.clone(),
        }
    }
}

fn validate_band(name: &str, band: &Band) -> Result<()> {
    if band.nominal <= 0.0 {
        bail!("{}.nominal must be positive, got {}", name, band.nominal);
    }
    if band.warning_pct < 0.0 || band.critical_pct < band.warning_pct {
        bail!(
            "{}: warning_pct ({}) must be non-negative and not above critical_pct ({})",
            name,
            band.warning_pct,
            band.critical_pct
        );
    }
    Ok(())
}
