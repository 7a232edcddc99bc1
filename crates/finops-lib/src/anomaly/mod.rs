//! Cost anomaly detection
//!
//! This module provides detection for:
//! - Deviations from the 7-day rolling average
//! - Day-over-day cost spikes
//! - Weekend spend on resources that should be quiet
//! - Expensive resources created in the last few days
//! - Per-resource spikes against the 7-day average

mod calendar;
mod rolling;
mod spike;

pub use calendar::{NewResourceCost, NewResourceDetector, WeekendAnomaly, WeekendDetector};
pub use rolling::{
    DayOverDayDetector, DayOverDaySpike, RollingAverageDetector, RollingDeviation,
};
pub use spike::{ResourceSpikeScanner, SpikeFinding};

use serde::{Deserialize, Serialize};

/// Severity of a cost anomaly finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalySeverity {
    Warning,
    High,
}
