//! Layer 3: fully-loaded aggregation and the zero-leakage assertion
//!
//! Merges direct and shared allocations per cost center and verifies that
//! every unit of input cost is accounted for. A non-zero leakage is a bug
//! in the distribution layer, not a data-quality condition: the run fails
//! instead of emitting a silently wrong report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

use crate::allocation::direct::DirectAllocation;
use crate::allocation::shared::SharedOutcome;
use crate::numeric::round_to;

/// Fatal engine errors
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The zero-leakage invariant was violated after reconciliation
    #[error(
        "allocation leakage detected: grand total {grand_total:.2} differs from \
         input total {expected:.2} by {leakage:.2}"
    )]
    LeakageDetected {
        leakage: f64,
        grand_total: f64,
        expected: f64,
    },
}

/// Fully-loaded cost for one cost center
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullyLoadedCost {
    pub direct: f64,
    pub shared: f64,
    pub total: f64,
    /// Shared spend broken down by the contributing shared resource
    pub shared_breakdown: BTreeMap<String, f64>,
}

/// Aggregated output across all cost centers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullyLoadedReport {
    pub cost_centers: BTreeMap<String, FullyLoadedCost>,
    pub untagged_quarantine: f64,
    pub grand_total: f64,
    /// Always zero to the configured precision; anything else aborts the run
    pub leakage: f64,
}

/// Merge direct and shared allocations and assert zero leakage
pub(crate) fn aggregate(
    direct: &DirectAllocation,
    shared_distributions: &BTreeMap<String, SharedOutcome>,
    precision: u32,
) -> Result<FullyLoadedReport, AllocationError> {
    let tolerance = round_to(10f64.powi(-(precision as i32)), precision);
    let mut cost_centers: BTreeMap<String, FullyLoadedCost> = BTreeMap::new();

    for (cc, data) in &direct.by_cost_center {
        cost_centers.entry(cc.clone()).or_default().direct = round_to(data.direct, precision);
    }

    for (resource_name, outcome) in shared_distributions {
        let Some(allocation) = outcome.allocation() else {
            continue;
        };
        for (cc, amount) in &allocation.allocation {
            let entry = cost_centers.entry(cc.clone()).or_default();
            entry.shared += amount;
            *entry
                .shared_breakdown
                .entry(resource_name.clone())
                .or_default() += amount;
        }
    }

    let mut grand_total = 0.0;
    for cost in cost_centers.values_mut() {
        cost.shared = round_to(cost.shared, precision);
        cost.total = round_to(cost.direct + cost.shared, precision);
        for amount in cost.shared_breakdown.values_mut() {
            *amount = round_to(*amount, precision);
        }
        grand_total += cost.total;
    }

    let untagged_quarantine = round_to(direct.untagged.total, precision);
    let grand_total = round_to(grand_total + untagged_quarantine, precision);

    // Input side of the conservation equation: every resource cost landed
    // either in a direct total or in quarantine, and every successfully
    // distributed shared cost was admitted at its full amount. Failed
    // distributions never entered the allocation, so they are excluded.
    let expected = direct.direct_total()
        + direct.untagged.total
        + shared_distributions
            .values()
            .filter_map(|o| o.allocation())
            .map(|a| a.total_cost)
            .sum::<f64>();

    let leakage = grand_total - expected;
    if leakage.abs() > tolerance {
        error!(
            event = "leakage_assertion_failed",
            leakage,
            grand_total,
            expected,
            "allocated totals do not reconcile with input costs"
        );
        return Err(AllocationError::LeakageDetected {
            leakage,
            grand_total,
            expected,
        });
    }

    Ok(FullyLoadedReport {
        cost_centers,
        untagged_quarantine,
        grand_total,
        leakage: round_to(leakage, precision),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::direct::{CostCenterDirect, QuarantineBucket, QuarantinedResource};
    use crate::allocation::shared::Allocation;
    use crate::models::AllocationMethod;

    fn direct_fixture() -> DirectAllocation {
        let mut direct = DirectAllocation::default();
        direct.by_cost_center.insert(
            "Eng".to_string(),
            CostCenterDirect {
                direct: 100.0,
                resources: vec!["vm-a".into(), "vm-b".into()],
            },
        );
        direct.untagged = QuarantineBucket {
            total: 10.0,
            resources: vec![QuarantinedResource {
                name: "vm-x".into(),
                cost: 10.0,
                id: String::new(),
                created: "unknown".into(),
            }],
        };
        direct
    }

    fn allocated(total_cost: f64, shares: &[(&str, f64)]) -> SharedOutcome {
        SharedOutcome::Allocated(Allocation {
            total_cost,
            method: AllocationMethod::Equal,
            rule: "r".into(),
            allocation: shares.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        })
    }

    #[test]
    fn test_merge_direct_and_shared() {
        let mut distributions = BTreeMap::new();
        distributions.insert("gateway".to_string(), allocated(20.0, &[("Eng", 20.0)]));

        let report = aggregate(&direct_fixture(), &distributions, 2).unwrap();
        let eng = &report.cost_centers["Eng"];
        assert_eq!(eng.direct, 100.0);
        assert_eq!(eng.shared, 20.0);
        assert_eq!(eng.total, 120.0);
        assert_eq!(eng.shared_breakdown["gateway"], 20.0);
        assert_eq!(report.grand_total, 130.0);
        assert_eq!(report.leakage, 0.0);
    }

    #[test]
    fn test_center_known_only_from_shared_allocation() {
        let mut distributions = BTreeMap::new();
        distributions.insert(
            "firewall".to_string(),
            allocated(50.0, &[("Eng", 30.0), ("Data", 20.0)]),
        );

        let report = aggregate(&direct_fixture(), &distributions, 2).unwrap();
        let data = &report.cost_centers["Data"];
        assert_eq!(data.direct, 0.0);
        assert_eq!(data.shared, 20.0);
        assert_eq!(data.total, 20.0);
    }

    #[test]
    fn test_failed_distribution_is_excluded_from_totals() {
        let mut distributions = BTreeMap::new();
        distributions.insert(
            "broken".to_string(),
            SharedOutcome::Failed(crate::allocation::shared::DistributionFailure {
                error: "no allocation rule named `r9`".into(),
            }),
        );

        let report = aggregate(&direct_fixture(), &distributions, 2).unwrap();
        assert_eq!(report.grand_total, 110.0);
        assert_eq!(report.cost_centers["Eng"].shared, 0.0);
    }

    #[test]
    fn test_leakage_assertion_fails_loudly() {
        // A tampered allocation whose shares do not sum to its cost models
        // a reconciliation bug in the distribution layer.
        let mut distributions = BTreeMap::new();
        distributions.insert("gateway".to_string(), allocated(20.0, &[("Eng", 5.0)]));

        let err = aggregate(&direct_fixture(), &distributions, 2).unwrap_err();
        match err {
            AllocationError::LeakageDetected { leakage, .. } => {
                assert!((leakage + 15.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_quarantine_counts_toward_grand_total() {
        let report = aggregate(&direct_fixture(), &BTreeMap::new(), 2).unwrap();
        assert_eq!(report.untagged_quarantine, 10.0);
        assert_eq!(report.grand_total, 110.0);
    }
}
