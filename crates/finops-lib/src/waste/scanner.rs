//! Five-category waste scanner
//!
//! Each category produces findings with a disposition and, where it can be
//! computed, a savings figure. The savings summary treats idle and orphan
//! cost as confirmed and schedule savings as an estimate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::WasteThresholds;
use crate::models::ResourceRecord;
use crate::numeric::round2;

/// Resource types that can follow a start/stop schedule
const SCHEDULABLE_TYPES: &[&str] = &[
    "Microsoft.Compute/virtualMachines",
    "Microsoft.Web/serverfarms",
    "Microsoft.Sql/servers/databases",
];

/// Monthly hours above which a schedulable resource counts as always-on
const ALWAYS_ON_HOURS: f64 = 400.0;

/// Business-hours runtime (8am-6pm, Mon-Fri) in hours per month
const BUSINESS_HOURS: f64 = 220.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Idle,
    Rightsizing,
    Orphan,
    Schedule,
    Aged,
}

impl WasteCategory {
    fn finding_prefix(&self) -> &'static str {
        match self {
            WasteCategory::Idle => "WASTE-IDLE",
            WasteCategory::Rightsizing => "WASTE-RSIZE",
            WasteCategory::Orphan => "WASTE-ORPHAN",
            WasteCategory::Schedule => "WASTE-SCHED",
            WasteCategory::Aged => "WASTE-AGED",
        }
    }
}

/// Recommended action for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Decommission,
    Investigate,
    Rightsize,
    Defer,
    Schedule,
    Review,
}

/// One waste finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteFinding {
    pub finding_id: String,
    pub category: WasteCategory,
    pub resource: String,
    pub resource_id: String,
    pub resource_type: String,
    pub monthly_cost: f64,
    pub reason: String,
    pub recommended_disposition: Disposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
}

/// Counts and money per category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WasteByCategory {
    pub idle: CategoryTotals,
    pub rightsizing: CategoryTotals,
    pub orphans: CategoryTotals,
    pub schedule: CategoryTotals,
    pub aged: CategoryTotals,
}

/// Savings rollup across categories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavingsSummary {
    /// Idle plus orphan cost: stops immediately on decommission
    pub confirmed: f64,
    pub rightsizing: f64,
    pub schedule_estimated: f64,
    pub total_potential: f64,
}

/// Full scan output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteScanReport {
    pub scan_date: NaiveDate,
    pub resources_scanned: usize,
    pub total_findings: usize,
    pub by_category: WasteByCategory,
    pub savings_summary: SavingsSummary,
    pub findings: Vec<WasteFinding>,
}

/// Scans the inventory for the five waste categories
pub struct WasteScanner {
    pub thresholds: WasteThresholds,
}

impl WasteScanner {
    pub fn new(thresholds: WasteThresholds) -> Self {
        Self { thresholds }
    }

    /// Category 1: resources with near-zero utilization
    pub fn scan_idle(&self, resources: &[ResourceRecord]) -> Vec<WasteFinding> {
        let mut findings = Vec::new();
        for r in resources {
            let m = &r.metrics;
            if m.avg_cpu_pct < self.thresholds.idle_cpu_pct
                && m.low_util_days >= self.thresholds.idle_days
            {
                let zero_connections = m.network_connections_30d == 0;
                let mut reason = format!(
                    "CPU avg {}% for {} days",
                    m.avg_cpu_pct, m.low_util_days
                );
                if zero_connections {
                    reason.push_str(", 0 network connections");
                }
                findings.push(WasteFinding {
                    finding_id: finding_id(WasteCategory::Idle, findings.len()),
                    category: WasteCategory::Idle,
                    resource: r.name.clone(),
                    resource_id: r.id.clone(),
                    resource_type: r.resource_type.clone(),
                    monthly_cost: r.monthly_cost,
                    reason,
                    recommended_disposition: if zero_connections {
                        Disposition::Decommission
                    } else {
                        Disposition::Investigate
                    },
                    monthly_savings: None,
                    potential_savings: None,
                });
            }
        }
        findings
    }

    /// Category 2: over-provisioned resources with a cheaper SKU available
    pub fn scan_rightsizing(&self, resources: &[ResourceRecord]) -> Vec<WasteFinding> {
        let mut findings = Vec::new();
        for r in resources {
            let m = &r.metrics;
            let has_recommendation =
                !r.recommended_sku.is_empty() && r.recommended_sku != r.sku;
            if m.p95_cpu_pct < self.thresholds.overprovisioned_p95_pct && has_recommendation {
                let recommended_cost = r.recommended_cost.unwrap_or(r.monthly_cost);
                let savings = r.monthly_cost - recommended_cost;
                let production = r
                    .tag("Environment")
                    .map(|e| e.eq_ignore_ascii_case("production"))
                    .unwrap_or(false);

                let mut reason = format!(
                    "P95 CPU {}%, current {} -> {}",
                    m.p95_cpu_pct, r.sku, r.recommended_sku
                );
                if production {
                    reason.push_str(" (PRODUCTION, defer)");
                }
                findings.push(WasteFinding {
                    finding_id: finding_id(WasteCategory::Rightsizing, findings.len()),
                    category: WasteCategory::Rightsizing,
                    resource: r.name.clone(),
                    resource_id: r.id.clone(),
                    resource_type: r.resource_type.clone(),
                    monthly_cost: r.monthly_cost,
                    reason,
                    recommended_disposition: if production {
                        Disposition::Defer
                    } else {
                        Disposition::Rightsize
                    },
                    monthly_savings: Some(round2(savings)),
                    potential_savings: None,
                });
            }
        }
        findings
    }

    /// Category 3: resources that lost their parent
    pub fn scan_orphans(&self, resources: &[ResourceRecord]) -> Vec<WasteFinding> {
        let mut findings = Vec::new();
        for r in resources {
            let label = match r.resource_type.as_str() {
                "Microsoft.Compute/disks" if r.attached_vm.is_none() => "Unattached disk",
                "Microsoft.Network/publicIPAddresses" if r.attached_nic.is_none() => {
                    "Unattached public IP"
                }
                "Microsoft.Network/networkInterfaces" if r.attached_vm.is_none() => {
                    "Unattached NIC"
                }
                "Microsoft.Network/networkSecurityGroups"
                    if r.attached_nic_count.unwrap_or(0) == 0 =>
                {
                    "Unattached NSG"
                }
                "Microsoft.Compute/snapshots"
                    if r.age_days.unwrap_or(0) > self.thresholds.orphan_snapshot_days =>
                {
                    "Aged snapshot"
                }
                _ => continue,
            };

            let mut reason = label.to_string();
            if r.resource_type == "Microsoft.Compute/snapshots" {
                reason.push_str(&format!(", {} days old", r.age_days.unwrap_or(0)));
            }
            findings.push(WasteFinding {
                finding_id: finding_id(WasteCategory::Orphan, findings.len()),
                category: WasteCategory::Orphan,
                resource: r.name.clone(),
                resource_id: r.id.clone(),
                resource_type: r.resource_type.clone(),
                monthly_cost: r.monthly_cost,
                reason,
                recommended_disposition: Disposition::Decommission,
                monthly_savings: None,
                potential_savings: None,
            });
        }
        findings
    }

    /// Category 4: always-on resources in environments that should sleep
    pub fn scan_schedule(&self, resources: &[ResourceRecord]) -> Vec<WasteFinding> {
        let mut findings = Vec::new();
        for r in resources {
            let Some(env) = r.tag("Environment").map(str::to_lowercase) else {
                continue;
            };
            if !self.thresholds.schedule_envs.contains(&env) {
                continue;
            }
            if !SCHEDULABLE_TYPES.contains(&r.resource_type.as_str()) {
                continue;
            }

            let hours_running = r.metrics.hours_per_month;
            if hours_running > ALWAYS_ON_HOURS {
                let waste_hours = hours_running - BUSINESS_HOURS;
                let waste_pct = (waste_hours / hours_running * 100.0).round();
                let potential = round2(r.monthly_cost * waste_pct / 100.0);

                findings.push(WasteFinding {
                    finding_id: finding_id(WasteCategory::Schedule, findings.len()),
                    category: WasteCategory::Schedule,
                    resource: r.name.clone(),
                    resource_id: r.id.clone(),
                    resource_type: r.resource_type.clone(),
                    monthly_cost: r.monthly_cost,
                    reason: format!(
                        "{} resource running {}hrs/month, recommend {}hrs",
                        env, hours_running, BUSINESS_HOURS
                    ),
                    recommended_disposition: Disposition::Schedule,
                    monthly_savings: None,
                    potential_savings: Some(potential),
                });
            }
        }
        findings
    }

    /// Category 5: resources past their expiry or review date
    pub fn scan_aged(&self, resources: &[ResourceRecord], today: NaiveDate) -> Vec<WasteFinding> {
        let mut findings = Vec::new();
        for r in resources {
            if let Some(expiry) = r.tag("ExpiryDate").and_then(|v| v.parse::<NaiveDate>().ok()) {
                if expiry < today {
                    let days_past = (today - expiry).num_days();
                    findings.push(WasteFinding {
                        finding_id: finding_id(WasteCategory::Aged, findings.len()),
                        category: WasteCategory::Aged,
                        resource: r.name.clone(),
                        resource_id: r.id.clone(),
                        resource_type: r.resource_type.clone(),
                        monthly_cost: r.monthly_cost,
                        reason: format!("ExpiryDate {}, {} days past", expiry, days_past),
                        recommended_disposition: Disposition::Decommission,
                        monthly_savings: None,
                        potential_savings: None,
                    });
                }
            }

            if let Some(review) = r.tag("ReviewDate").and_then(|v| v.parse::<NaiveDate>().ok()) {
                if review < today {
                    let days_overdue = (today - review).num_days();
                    findings.push(WasteFinding {
                        finding_id: finding_id(WasteCategory::Aged, findings.len()),
                        category: WasteCategory::Aged,
                        resource: r.name.clone(),
                        resource_id: r.id.clone(),
                        resource_type: r.resource_type.clone(),
                        monthly_cost: r.monthly_cost,
                        reason: format!("ReviewDate {}, {} days overdue", review, days_overdue),
                        recommended_disposition: Disposition::Review,
                        monthly_savings: None,
                        potential_savings: None,
                    });
                }
            }
        }
        findings
    }

    /// Run all five categories and roll up the savings summary
    pub fn run_full_scan(&self, resources: &[ResourceRecord], today: NaiveDate) -> WasteScanReport {
        let idle = self.scan_idle(resources);
        let rightsizing = self.scan_rightsizing(resources);
        let orphans = self.scan_orphans(resources);
        let schedule = self.scan_schedule(resources);
        let aged = self.scan_aged(resources, today);

        let idle_cost: f64 = idle.iter().map(|f| f.monthly_cost).sum();
        let orphan_cost: f64 = orphans.iter().map(|f| f.monthly_cost).sum();
        let rightsizing_savings: f64 =
            rightsizing.iter().filter_map(|f| f.monthly_savings).sum();
        let schedule_savings: f64 =
            schedule.iter().filter_map(|f| f.potential_savings).sum();

        let by_category = WasteByCategory {
            idle: CategoryTotals {
                count: idle.len(),
                monthly_cost: Some(round2(idle_cost)),
                ..Default::default()
            },
            rightsizing: CategoryTotals {
                count: rightsizing.len(),
                monthly_savings: Some(round2(rightsizing_savings)),
                ..Default::default()
            },
            orphans: CategoryTotals {
                count: orphans.len(),
                monthly_cost: Some(round2(orphan_cost)),
                ..Default::default()
            },
            schedule: CategoryTotals {
                count: schedule.len(),
                potential_savings: Some(round2(schedule_savings)),
                ..Default::default()
            },
            aged: CategoryTotals {
                count: aged.len(),
                ..Default::default()
            },
        };

        let confirmed = round2(idle_cost + orphan_cost);
        let savings_summary = SavingsSummary {
            confirmed,
            rightsizing: round2(rightsizing_savings),
            schedule_estimated: round2(schedule_savings),
            total_potential: round2(idle_cost + orphan_cost + rightsizing_savings + schedule_savings),
        };

        let mut findings = Vec::new();
        findings.extend(idle);
        findings.extend(rightsizing);
        findings.extend(orphans);
        findings.extend(schedule);
        findings.extend(aged);

        info!(
            event = "waste_scan_complete",
            resources = resources.len(),
            findings = findings.len(),
            total_potential = savings_summary.total_potential,
            "waste scan finished"
        );

        WasteScanReport {
            scan_date: today,
            resources_scanned: resources.len(),
            total_findings: findings.len(),
            by_category,
            savings_summary,
            findings,
        }
    }
}

impl Default for WasteScanner {
    fn default() -> Self {
        Self::new(WasteThresholds::default())
    }
}

fn finding_id(category: WasteCategory, existing: usize) -> String {
    format!("{}-{:03}", category.finding_prefix(), existing + 1)
}
