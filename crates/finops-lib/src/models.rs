//! Core data models for the governance toolkit
//!
//! Every analyzer consumes one of the typed inventory documents below.
//! Field defaults mirror the tolerant input handling of the upstream
//! exporters: missing numeric fields read as zero, missing maps as empty.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One billable cloud resource for the reporting period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default = "default_created_date")]
    pub created_date: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub metrics: UtilizationMetrics,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub recommended_sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_cost: Option<f64>,
    /// VM id a disk or NIC is attached to, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_vm: Option<String>,
    /// NIC id a public IP is associated with, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_nic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_nic_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_subnet_count: Option<u32>,
    /// Age of a snapshot in days, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_days: Option<u32>,
    /// Number of resources a resource group contains, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
}

impl ResourceRecord {
    /// Look up a tag value, treating an empty string as absent
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Observed utilization for a resource over the reporting window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationMetrics {
    #[serde(default = "default_full_pct")]
    pub avg_cpu_pct: f64,
    #[serde(default = "default_full_pct")]
    pub p95_cpu_pct: f64,
    #[serde(default = "default_full_pct")]
    pub p95_memory_pct: f64,
    #[serde(default)]
    pub low_util_days: u32,
    /// Negative means the exporter did not report connection counts
    #[serde(default = "default_unknown_connections")]
    pub network_connections_30d: i64,
    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: f64,
}

impl Default for UtilizationMetrics {
    fn default() -> Self {
        Self {
            avg_cpu_pct: default_full_pct(),
            p95_cpu_pct: default_full_pct(),
            p95_memory_pct: default_full_pct(),
            low_util_days: 0,
            network_connections_30d: default_unknown_connections(),
            hours_per_month: default_hours_per_month(),
        }
    }
}

/// A cost not directly attributable to one cost center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedResource {
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(default)]
    pub allocation_rule: String,
    /// Cost-center weights, consumed only by the proportional method
    #[serde(default)]
    pub allocation_weights: BTreeMap<String, f64>,
}

/// Named policy describing how a shared cost is split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRule {
    pub name: String,
    #[serde(default = "default_allocation_method")]
    pub method: AllocationMethod,
    /// Fractions of 1.0 per cost center, consumed only by the fixed method
    #[serde(default)]
    pub fixed_splits: BTreeMap<String, f64>,
}

/// Closed set of shared-cost distribution methods
///
/// An unrecognized method string deserializes to `Unknown` and is reported
/// as a per-resource distribution error rather than failing the whole rule
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMethod {
    Proportional,
    Equal,
    Fixed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AllocationMethod::Proportional => "proportional",
            AllocationMethod::Equal => "equal",
            AllocationMethod::Fixed => "fixed",
            AllocationMethod::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One day of observed spend, optionally scoped to a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
}

impl DailyCost {
    /// Resource label, falling back to the subscription-wide scope
    pub fn resource_label(&self) -> &str {
        self.resource.as_deref().unwrap_or("Subscription")
    }
}

/// Per-resource cost snapshot for spike scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCostSnapshot {
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub seven_day_avg: f64,
    #[serde(default)]
    pub today_cost: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Reservation candidate workload with its utilization history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Daily utilization percentages over the observation window
    #[serde(default)]
    pub daily_utilization: Vec<f64>,
    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: f64,
    #[serde(default = "default_term_months")]
    pub term_months: u32,
}

/// Pricing quote for one reservation term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermQuote {
    #[serde(default = "default_term_months")]
    pub months: u32,
    #[serde(default)]
    pub ri_monthly: f64,
    #[serde(default)]
    pub upfront: f64,
    #[serde(default)]
    pub discount_pct: f64,
}

/// Break-even candidate: on-demand price plus quoted terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenCandidate {
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default)]
    pub on_demand_monthly: f64,
    #[serde(default)]
    pub terms: Vec<TermQuote>,
}

/// One active reservation in the register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub reservation_type: String,
    #[serde(default = "default_term_months")]
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(default)]
    pub on_demand_equivalent: f64,
    #[serde(default)]
    pub utilization_pct: f64,
    #[serde(default)]
    pub monthly_savings: f64,
}

/// Directory entry used to validate Owner tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    #[serde(rename = "userPrincipalName", default)]
    pub user_principal_name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// Monthly budget for one cost center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub monthly: f64,
}

// Document wrappers matching the exported JSON shapes.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceInventory {
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedResourceList {
    #[serde(default)]
    pub shared_resources: Vec<SharedResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<AllocationRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyCostSeries {
    #[serde(default)]
    pub daily_costs: Vec<DailyCost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCostReport {
    #[serde(default)]
    pub resources: Vec<ResourceCostSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkloadList {
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateList {
    #[serde(default)]
    pub candidates: Vec<BreakEvenCandidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationRegister {
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetBook {
    #[serde(default)]
    pub budgets: BTreeMap<String, Budget>,
}

fn default_resource_name() -> String {
    "Unknown".to_string()
}

fn default_created_date() -> String {
    "unknown".to_string()
}

fn default_allocation_method() -> AllocationMethod {
    AllocationMethod::Equal
}

fn default_full_pct() -> f64 {
    100.0
}

fn default_unknown_connections() -> i64 {
    -1
}

fn default_hours_per_month() -> f64 {
    730.0
}

fn default_term_months() -> u32 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_defaults() {
        let r: ResourceRecord = serde_json::from_str(r#"{"name": "vm-web-01"}"#).unwrap();
        assert_eq!(r.name, "vm-web-01");
        assert_eq!(r.monthly_cost, 0.0);
        assert!(r.tags.is_empty());
        assert_eq!(r.created_date, "unknown");
        assert_eq!(r.metrics.avg_cpu_pct, 100.0);
        assert_eq!(r.metrics.network_connections_30d, -1);
    }

    #[test]
    fn test_empty_tag_reads_as_absent() {
        let r: ResourceRecord = serde_json::from_str(
            r#"{"name": "vm", "tags": {"CostCenter": "", "Owner": "alice"}}"#,
        )
        .unwrap();
        assert_eq!(r.tag("CostCenter"), None);
        assert_eq!(r.tag("Owner"), Some("alice"));
        assert_eq!(r.tag("Project"), None);
    }

    #[test]
    fn test_unknown_method_is_not_a_parse_failure() {
        let rule: AllocationRule =
            serde_json::from_str(r#"{"name": "r1", "method": "bogus"}"#).unwrap();
        assert_eq!(rule.method, AllocationMethod::Unknown);
    }

    #[test]
    fn test_missing_method_defaults_to_equal() {
        let rule: AllocationRule = serde_json::from_str(r#"{"name": "r1"}"#).unwrap();
        assert_eq!(rule.method, AllocationMethod::Equal);
    }

    #[test]
    fn test_inventory_wrapper() {
        let inv: ResourceInventory =
            serde_json::from_str(r#"{"resources": [{"name": "a", "monthly_cost": 12.5}]}"#)
                .unwrap();
        assert_eq!(inv.resources.len(), 1);
        assert_eq!(inv.resources[0].monthly_cost, 12.5);
    }
}
