//! Three-layer cost allocation engine
//!
//! This module distributes cloud spend across cost centers:
//! - Layer 1: direct attribution via the CostCenter tag
//! - Layer 2: shared cost distribution (proportional, equal, fixed)
//! - Layer 3: untagged cost quarantine
//!
//! Invariant: total allocated cost exactly equals total input cost. The
//! aggregation layer asserts this and refuses to produce a report when it
//! does not hold.

mod aggregate;
mod direct;
mod shared;


pub use aggregate::{AllocationError, FullyLoadedCost, FullyLoadedReport};
pub use direct::{
    CostCenterDirect, DirectAllocation, QuarantineBucket, QuarantinedResource, UNASSIGNED,
};
pub use shared::{Allocation, DistributionError, DistributionFailure, SharedOutcome};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::models::{AllocationRule, ResourceRecord, SharedResource};

/// Default rounding precision in decimal places (whole cents)
pub const DEFAULT_PRECISION: u32 = 2;

/// Composite output of one allocation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    pub allocation_date: String,
    pub direct: DirectAllocation,
    pub shared_distributions: BTreeMap<String, SharedOutcome>,
    pub fully_loaded: FullyLoadedReport,
}

/// Cost allocation engine
///
/// A pure function of its three inputs: the same inventory, shared
/// resources, and rules always produce the same report.
#[derive(Debug, Clone)]
pub struct CostAllocator {
    /// Rounding precision in decimal places
    pub precision: u32,
}

impl CostAllocator {
    /// Create an allocator with the default currency precision
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }

    /// Set a custom rounding precision
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Layer 1: partition resources into cost-center totals and quarantine
    pub fn allocate_direct(&self, resources: &[ResourceRecord]) -> DirectAllocation {
        direct::allocate_direct(resources)
    }

    /// Layer 2: split each shared cost across cost centers per its rule
    pub fn distribute_shared(
        &self,
        shared_resources: &[SharedResource],
        known_cost_centers: &BTreeSet<String>,
        rules: &[AllocationRule],
    ) -> BTreeMap<String, SharedOutcome> {
        shared::distribute_shared(shared_resources, known_cost_centers, rules, self.precision)
    }

    /// Layer 3: merge direct and shared spend and assert zero leakage
    pub fn aggregate(
        &self,
        direct: &DirectAllocation,
        shared_distributions: &BTreeMap<String, SharedOutcome>,
    ) -> Result<FullyLoadedReport, AllocationError> {
        aggregate::aggregate(direct, shared_distributions, self.precision)
    }

    /// Run the full pipeline over one inventory snapshot
    pub fn run(
        &self,
        resources: &[ResourceRecord],
        shared_resources: &[SharedResource],
        rules: &[AllocationRule],
        allocation_date: NaiveDate,
    ) -> Result<AllocationReport, AllocationError> {
        let direct = self.allocate_direct(resources);
        let known_cost_centers = direct.cost_centers();
        let shared_distributions =
            self.distribute_shared(shared_resources, &known_cost_centers, rules);
        let fully_loaded = self.aggregate(&direct, &shared_distributions)?;

        info!(
            event = "allocation_complete",
            resources = resources.len(),
            shared_resources = shared_resources.len(),
            cost_centers = fully_loaded.cost_centers.len(),
            grand_total = fully_loaded.grand_total,
            quarantine = fully_loaded.untagged_quarantine,
            "allocation run reconciled"
        );

        Ok(AllocationReport {
            allocation_date: allocation_date.to_string(),
            direct,
            shared_distributions,
            fully_loaded,
        })
    }
}

impl Default for CostAllocator {
    fn default() -> Self {
        Self::new()
    }
}
