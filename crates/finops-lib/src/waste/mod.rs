//! Cloud waste scanning
//!
//! This module covers five waste categories (idle, rightsizing, orphan,
//! schedule, aged), a P95-driven SKU rightsizing analyzer, and a
//! standalone orphan detector for parentless resources.

mod orphans;
mod rightsizing;
mod scanner;

pub use orphans::{OrphanDetector, OrphanFinding};
pub use rightsizing::{
    RightsizingAnalyzer, RightsizingAssessment, RightsizingOutcome, SizingRecommendation,
    SizingRisk, SkuSpec,
};
pub use scanner::{
    CategoryTotals, Disposition, SavingsSummary, WasteByCategory, WasteCategory, WasteFinding,
    WasteScanReport, WasteScanner,
};

use serde::{Deserialize, Serialize};

/// Tunable thresholds for the waste scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteThresholds {
    /// Average CPU below which a resource counts as idle
    #[serde(default = "default_idle_cpu_pct")]
    pub idle_cpu_pct: f64,
    /// Days of low utilization required before flagging idle
    #[serde(default = "default_idle_days")]
    pub idle_days: u32,
    /// Snapshot age in days beyond which it counts as orphaned
    #[serde(default = "default_orphan_snapshot_days")]
    pub orphan_snapshot_days: u32,
    /// P95 CPU below which a resource counts as over-provisioned
    #[serde(default = "default_overprovisioned_p95_pct")]
    pub overprovisioned_p95_pct: f64,
    /// Environments that should follow a business-hours schedule
    #[serde(default = "default_schedule_envs")]
    pub schedule_envs: Vec<String>,
}

impl Default for WasteThresholds {
    fn default() -> Self {
        Self {
            idle_cpu_pct: default_idle_cpu_pct(),
            idle_days: default_idle_days(),
            orphan_snapshot_days: default_orphan_snapshot_days(),
            overprovisioned_p95_pct: default_overprovisioned_p95_pct(),
            schedule_envs: default_schedule_envs(),
        }
    }
}

fn default_idle_cpu_pct() -> f64 {
    5.0
}

fn default_idle_days() -> u32 {
    14
}

fn default_orphan_snapshot_days() -> u32 {
    90
}

fn default_overprovisioned_p95_pct() -> f64 {
    40.0
}

fn default_schedule_envs() -> Vec<String> {
    vec![
        "development".to_string(),
        "test".to_string(),
        "sandbox".to_string(),
    ]
}
