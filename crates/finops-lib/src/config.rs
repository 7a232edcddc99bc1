//! Analysis configuration
//!
//! Thresholds are loaded from `FINOPS_*` environment variables and an
//! optional config file. They tune sensitivities only; allocation
//! semantics are never configuration-dependent.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::waste::WasteThresholds;

/// Tunable thresholds for the analytics suite
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Rounding precision for currency amounts, in decimal places
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// 7-day rolling average deviation threshold (percent)
    #[serde(default = "default_rolling_threshold_pct")]
    pub rolling_threshold_pct: f64,

    /// Day-over-day spike threshold (percent)
    #[serde(default = "default_dod_threshold_pct")]
    pub dod_threshold_pct: f64,

    /// Weekend cost vs weekday average multiplier
    #[serde(default = "default_weekend_multiplier")]
    pub weekend_multiplier: f64,

    /// Daily cost floor for flagging new resources
    #[serde(default = "default_new_resource_daily_threshold")]
    pub new_resource_daily_threshold: f64,

    /// Days a resource counts as new
    #[serde(default = "default_new_resource_lookback_days")]
    pub new_resource_lookback_days: u64,

    /// Per-resource spike multiplier over the 7-day average
    #[serde(default = "default_spike_multiplier")]
    pub spike_multiplier: f64,

    /// Waste scanner thresholds
    #[serde(default)]
    pub waste: WasteThresholds,
}

fn default_precision() -> u32 {
    2
}

fn default_rolling_threshold_pct() -> f64 {
    30.0
}

fn default_dod_threshold_pct() -> f64 {
    50.0
}

fn default_weekend_multiplier() -> f64 {
    2.0
}

fn default_new_resource_daily_threshold() -> f64 {
    25.0
}

fn default_new_resource_lookback_days() -> u64 {
    7
}

fn default_spike_multiplier() -> f64 {
    2.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            rolling_threshold_pct: default_rolling_threshold_pct(),
            dod_threshold_pct: default_dod_threshold_pct(),
            weekend_multiplier: default_weekend_multiplier(),
            new_resource_daily_threshold: default_new_resource_daily_threshold(),
            new_resource_lookback_days: default_new_resource_lookback_days(),
            spike_multiplier: default_spike_multiplier(),
            waste: WasteThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::load_with_file(None::<&Path>)
    }

    /// Load configuration from an optional file plus the environment;
    /// the environment wins on conflicts
    pub fn load_with_file(path: Option<impl AsRef<Path>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("FINOPS").separator("__"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.precision, 2);
        assert_eq!(cfg.rolling_threshold_pct, 30.0);
        assert_eq!(cfg.dod_threshold_pct, 50.0);
        assert_eq!(cfg.waste.idle_cpu_pct, 5.0);
        assert_eq!(cfg.waste.idle_days, 14);
    }

    #[test]
    fn test_load_without_sources_falls_back_to_defaults() {
        let cfg = AnalysisConfig::load().unwrap();
        assert_eq!(cfg.spike_multiplier, 2.0);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"rolling_threshold_pct": 45.0, "waste": {{"idle_days": 7}}}}"#
        )
        .unwrap();

        let cfg = AnalysisConfig::load_with_file(Some(file.path())).unwrap();
        assert_eq!(cfg.rolling_threshold_pct, 45.0);
        assert_eq!(cfg.waste.idle_days, 7);
        // Untouched fields keep their defaults
        assert_eq!(cfg.dod_threshold_pct, 50.0);
    }
}
