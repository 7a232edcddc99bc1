//! Per-resource spike scanning
//!
//! Compares each resource's latest daily cost against its own 7-day
//! average and ranks findings by spend.

use serde::{Deserialize, Serialize};

use super::AnomalySeverity;
use crate::models::ResourceCostSnapshot;
use crate::numeric::{round1, round2};

/// Multiplier above which a spike escalates to HIGH
const HIGH_MULTIPLIER: f64 = 3.0;

/// Label used when an Owner or Environment tag is missing
const UNTAGGED: &str = "UNTAGGED";

/// One resource spiking above its own baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeFinding {
    pub resource: String,
    pub resource_id: String,
    pub today_cost: f64,
    pub seven_day_avg: f64,
    pub multiplier: f64,
    pub owner: String,
    pub environment: String,
    pub severity: AnomalySeverity,
}

/// Scans per-resource cost snapshots for abnormal daily increases
pub struct ResourceSpikeScanner {
    /// Today's cost must exceed this multiple of the 7-day average
    pub multiplier: f64,
}

impl ResourceSpikeScanner {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Returns findings sorted by today's cost, highest first
    pub fn scan(&self, resources: &[ResourceCostSnapshot]) -> Vec<SpikeFinding> {
        let mut findings: Vec<SpikeFinding> = resources
            .iter()
            .filter(|r| r.seven_day_avg > 0.0 && r.today_cost > r.seven_day_avg * self.multiplier)
            .map(|r| SpikeFinding {
                resource: r.name.clone(),
                resource_id: r.id.clone(),
                today_cost: round2(r.today_cost),
                seven_day_avg: round2(r.seven_day_avg),
                multiplier: round1(r.today_cost / r.seven_day_avg),
                owner: tag_or_untagged(r, "Owner"),
                environment: tag_or_untagged(r, "Environment"),
                severity: if r.today_cost > r.seven_day_avg * HIGH_MULTIPLIER {
                    AnomalySeverity::High
                } else {
                    AnomalySeverity::Warning
                },
            })
            .collect();

        findings.sort_by(|a, b| {
            b.today_cost
                .partial_cmp(&a.today_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.resource.cmp(&b.resource))
        });
        findings
    }
}

impl Default for ResourceSpikeScanner {
    fn default() -> Self {
        Self::new(2.0)
    }
}

fn tag_or_untagged(snapshot: &ResourceCostSnapshot, tag: &str) -> String {
    snapshot
        .tags
        .get(tag)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| UNTAGGED.to_string())
}
