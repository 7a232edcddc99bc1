//! Layer 1: direct attribution of tagged resource costs
//!
//! Partitions the inventory by presence of the `CostCenter` tag. Tagged
//! resources contribute their full cost to that cost center (and to the
//! owner/project/environment rollups); untagged resources land in the
//! quarantine bucket for later review. A resource never contributes to both.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::ResourceRecord;

/// Rollup key used when an Owner/Project/Environment tag is absent.
///
/// The CostCenter tag itself has no default: its absence routes the
/// resource to quarantine instead.
pub const UNASSIGNED: &str = "unassigned";

/// Direct spend attributed to one cost center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostCenterDirect {
    pub direct: f64,
    pub resources: Vec<String>,
}

/// Untagged resource parked in quarantine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantinedResource {
    pub name: String,
    pub cost: f64,
    pub id: String,
    pub created: String,
}

/// Costs of resources lacking a CostCenter tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuarantineBucket {
    pub total: f64,
    pub resources: Vec<QuarantinedResource>,
}

/// Output of the direct attribution layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectAllocation {
    pub by_cost_center: BTreeMap<String, CostCenterDirect>,
    pub by_owner: BTreeMap<String, f64>,
    pub by_project: BTreeMap<String, f64>,
    pub by_environment: BTreeMap<String, f64>,
    pub untagged: QuarantineBucket,
}

impl DirectAllocation {
    /// Cost centers discovered from the inventory
    pub fn cost_centers(&self) -> BTreeSet<String> {
        self.by_cost_center.keys().cloned().collect()
    }

    /// Sum of all directly attributed cost, excluding quarantine
    pub fn direct_total(&self) -> f64 {
        self.by_cost_center.values().map(|c| c.direct).sum()
    }
}

/// Attribute each resource to its tagged cost center or to quarantine
pub(crate) fn allocate_direct(resources: &[ResourceRecord]) -> DirectAllocation {
    let mut out = DirectAllocation::default();

    for resource in resources {
        let cost = resource.monthly_cost;

        match resource.tag("CostCenter") {
            Some(cc) => {
                let bucket = out.by_cost_center.entry(cc.to_string()).or_default();
                bucket.direct += cost;
                bucket.resources.push(resource.name.clone());

                for (tag, rollup) in [
                    ("Owner", &mut out.by_owner),
                    ("Project", &mut out.by_project),
                    ("Environment", &mut out.by_environment),
                ] {
                    let key = resource.tag(tag).unwrap_or(UNASSIGNED);
                    *rollup.entry(key.to_string()).or_default() += cost;
                }
            }
            None => {
                out.untagged.total += cost;
                out.untagged.resources.push(QuarantinedResource {
                    name: resource.name.clone(),
                    cost,
                    id: resource.id.clone(),
                    created: resource.created_date.clone(),
                });
            }
        }
    }

    out
}
