//! Controller configuration
//!
//! Loaded from JSON, either inline or from a file:
//!
//! ```json
//! {
//!   "gauge": { "preset": "pirani_log" },
//!   "unit": "Torr",
//!   "gas_correction": 1.0,
//!   "retry": { "max_attempts": 3, "base_backoff_ms": 50, "multiplier": 2.0 }
//! }
//! ```
//!
//! `gauge` names a built-in preset or carries a full profile under
//! `"custom"`. Every field except `gauge` has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vacuum_gauge_core::{
    presets, Fault, GaugeProfile, PressureUnit, ProfileError, ReadingSettings, RetryPolicy,
};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or unknown fields
    #[error("Invalid config syntax: {0}")]
    Parse(#[from] serde_json::Error),

    /// Profile failed validation
    #[error("Invalid gauge profile: {0}")]
    Profile(#[from] ProfileError),

    /// Unit, gas correction or retry policy rejected
    #[error("Invalid setting: {0}")]
    Setting(Fault),
}

/// Built-in gauge profiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Logarithmic-output Pirani head
    PiraniLog,
    /// Logarithmic-output cold-cathode head
    ColdCathodeLog,
    /// Pirani plus cold-cathode with crossover
    Combination,
    /// Linear capacitance diaphragm gauge
    Capacitance {
        /// Pressure at full-scale output
        full_scale: f64,
        /// Unit of `full_scale`
        unit: PressureUnit,
    },
}

impl Preset {
    /// Build the profile
    pub fn profile(self) -> Result<GaugeProfile, ProfileError> {
        match self {
            Self::PiraniLog => presets::pirani_log(),
            Self::ColdCathodeLog => presets::cold_cathode_log(),
            Self::Combination => presets::combination(),
            Self::Capacitance { full_scale, unit } => presets::capacitance(full_scale, unit),
        }
    }
}

/// Where the gauge profile comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeSource {
    /// Built-in profile
    Preset(Preset),
    /// Profile given in full
    Custom(GaugeProfile),
}

impl GaugeSource {
    /// Resolve and validate the profile
    pub fn profile(&self) -> Result<GaugeProfile, ProfileError> {
        match self {
            Self::Preset(preset) => preset.profile(),
            Self::Custom(profile) => {
                profile.validate()?;
                Ok(profile.clone())
            }
        }
    }
}

fn default_gas_correction() -> f64 {
    1.0
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Gauge profile
    pub gauge: GaugeSource,
    /// Output unit; the profile's default when absent
    #[serde(default)]
    pub unit: Option<PressureUnit>,
    /// Gas correction factor applied before unit conversion
    #[serde(default = "default_gas_correction")]
    pub gas_correction: f64,
    /// Retry and timeout policy
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ControllerConfig {
    /// Configuration for `preset` with defaults everywhere else
    pub fn preset(preset: Preset) -> Self {
        Self {
            gauge: GaugeSource::Preset(preset),
            unit: None,
            gas_correction: default_gas_correction(),
            retry: RetryPolicy::default(),
        }
    }

    /// Parse JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Resolve into validated reading settings and retry policy
    pub fn resolve(&self) -> Result<(ReadingSettings, RetryPolicy), ConfigError> {
        let profile = self.gauge.profile()?;
        let unit = self.unit.unwrap_or(profile.default_unit());
        let settings = ReadingSettings::new(profile, unit, self.gas_correction);
        settings.validate().map_err(ConfigError::Setting)?;
        self.retry.validate().map_err(ConfigError::Setting)?;
        Ok((settings, self.retry))
    }
}
