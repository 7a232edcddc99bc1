//! Layer 2: shared cost distribution
//!
//! Applies named allocation rules (proportional, equal, fixed) to shared
//! resources. A rule failure for one resource never aborts the batch: the
//! resource gets an error entry and processing continues. After the method
//! runs, a reconciliation step folds any rounding remainder into the first
//! cost center so the per-resource sum equals the resource cost exactly.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

use crate::models::{AllocationMethod, AllocationRule, SharedResource};
use crate::numeric::round_to;

/// Per-shared-resource distribution failure
///
/// These are data-quality conditions, not engine faults: they are recorded
/// in the output next to successful allocations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    #[error("no allocation rule named `{0}`")]
    UnknownRule(String),
    #[error("rule `{0}` uses an unrecognized allocation method")]
    UnknownMethod(String),
    #[error("rule `{0}` uses the fixed method but defines no fixed_splits")]
    MissingFixedSplits(String),
}

/// The split of one shared cost across cost centers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub total_cost: f64,
    pub method: AllocationMethod,
    pub rule: String,
    pub allocation: BTreeMap<String, f64>,
}

impl Allocation {
    /// Sum of all allocated shares
    pub fn allocated_total(&self) -> f64 {
        self.allocation.values().sum()
    }

    /// True when no shares were assigned against a non-zero cost, the
    /// signature of a zero-weight or zero-cost-center split
    pub fn is_degenerate(&self) -> bool {
        self.allocation.is_empty() && self.total_cost > 0.0
    }
}

/// Error entry recorded for a shared resource that could not be distributed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionFailure {
    pub error: String,
}

/// Result of distributing one shared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedOutcome {
    Allocated(Allocation),
    Failed(DistributionFailure),
}

impl SharedOutcome {
    fn failed(error: DistributionError) -> Self {
        SharedOutcome::Failed(DistributionFailure {
            error: error.to_string(),
        })
    }

    pub fn allocation(&self) -> Option<&Allocation> {
        match self {
            SharedOutcome::Allocated(a) => Some(a),
            SharedOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SharedOutcome::Allocated(_) => None,
            SharedOutcome::Failed(f) => Some(&f.error),
        }
    }
}

/// Distribute each shared resource across cost centers per its named rule
pub(crate) fn distribute_shared(
    shared_resources: &[SharedResource],
    known_cost_centers: &BTreeSet<String>,
    rules: &[AllocationRule],
    precision: u32,
) -> BTreeMap<String, SharedOutcome> {
    let tolerance = round_to(10f64.powi(-(precision as i32)), precision);
    let mut distributions = BTreeMap::new();

    for shared in shared_resources {
        let cost = shared.monthly_cost;

        let Some(rule) = rules.iter().find(|r| r.name == shared.allocation_rule) else {
            warn!(
                event = "distribution_failed",
                resource = %shared.name,
                rule = %shared.allocation_rule,
                "shared resource references an unknown allocation rule"
            );
            distributions.insert(
                shared.name.clone(),
                SharedOutcome::failed(DistributionError::UnknownRule(
                    shared.allocation_rule.clone(),
                )),
            );
            continue;
        };

        let mut allocation: BTreeMap<String, f64> = BTreeMap::new();

        match rule.method {
            AllocationMethod::Proportional => {
                let weights = &shared.allocation_weights;
                let total_weight: f64 = weights.values().sum();
                if total_weight > 0.0 {
                    for (cc, weight) in weights {
                        let share = cost * (weight / total_weight);
                        allocation.insert(cc.clone(), round_to(share, precision));
                    }
                } else {
                    warn!(
                        event = "degenerate_allocation",
                        resource = %shared.name,
                        rule = %rule.name,
                        "proportional split has zero total weight, no shares assigned"
                    );
                }
            }
            AllocationMethod::Equal => {
                let count = known_cost_centers.len();
                if count > 0 {
                    let per_cc = cost / count as f64;
                    for cc in known_cost_centers {
                        allocation.insert(cc.clone(), round_to(per_cc, precision));
                    }
                } else {
                    warn!(
                        event = "degenerate_allocation",
                        resource = %shared.name,
                        rule = %rule.name,
                        "equal split over zero known cost centers, no shares assigned"
                    );
                }
            }
            AllocationMethod::Fixed => {
                if rule.fixed_splits.is_empty() {
                    distributions.insert(
                        shared.name.clone(),
                        SharedOutcome::failed(DistributionError::MissingFixedSplits(
                            rule.name.clone(),
                        )),
                    );
                    continue;
                }
                let split_sum: f64 = rule.fixed_splits.values().sum();
                if (split_sum - 1.0).abs() > tolerance {
                    // Flag without correcting: the splits are applied as
                    // given and reconciliation absorbs any shortfall.
                    warn!(
                        event = "fixed_splits_unbalanced",
                        rule = %rule.name,
                        split_sum,
                        "fixed splits do not sum to 1.0"
                    );
                }
                for (cc, pct) in &rule.fixed_splits {
                    allocation.insert(cc.clone(), round_to(cost * pct, precision));
                }
            }
            AllocationMethod::Unknown => {
                distributions.insert(
                    shared.name.clone(),
                    SharedOutcome::failed(DistributionError::UnknownMethod(rule.name.clone())),
                );
                continue;
            }
        }

        reconcile(&mut allocation, cost, precision, tolerance);

        distributions.insert(
            shared.name.clone(),
            SharedOutcome::Allocated(Allocation {
                total_cost: cost,
                method: rule.method,
                rule: rule.name.clone(),
                allocation,
            }),
        );
    }

    distributions
}

/// Fold the rounding remainder into the lexicographically smallest cost
/// center so the allocation sums to `cost` exactly.
fn reconcile(allocation: &mut BTreeMap<String, f64>, cost: f64, precision: u32, tolerance: f64) {
    let allocated: f64 = allocation.values().sum();
    if allocation.is_empty() || (allocated - cost).abs() <= tolerance {
        return;
    }

    let first = allocation.keys().next().cloned();
    if let Some(first) = first {
        let remainder = round_to(cost - allocated, precision);
        if let Some(share) = allocation.get_mut(&first) {
            *share = round_to(*share + remainder, precision);
        }
    }
}
