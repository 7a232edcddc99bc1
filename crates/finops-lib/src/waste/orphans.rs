//! Orphan resource detection
//!
//! Finds resources that have lost their parent: disks without VMs, public
//! IPs without NICs, NICs without VMs, NSGs attached to nothing, aged
//! snapshots, and empty resource groups.

use serde::{Deserialize, Serialize};

use crate::models::ResourceRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanFinding {
    pub resource: String,
    pub resource_id: String,
    pub resource_type: String,
    pub reason: String,
    pub monthly_cost: f64,
    pub created_date: String,
}

/// Detects parentless resources across the inventory
pub struct OrphanDetector {
    /// Snapshot age in days beyond which it counts as orphaned
    pub snapshot_age_days: u32,
}

impl OrphanDetector {
    pub fn new(snapshot_age_days: u32) -> Self {
        Self { snapshot_age_days }
    }

    pub fn detect(&self, resources: &[ResourceRecord]) -> Vec<OrphanFinding> {
        let mut orphans = Vec::new();

        for r in resources {
            let reason = match r.resource_type.as_str() {
                "Microsoft.Compute/disks" if r.attached_vm.is_none() => {
                    "Managed disk not attached to any VM".to_string()
                }
                "Microsoft.Network/publicIPAddresses" if r.attached_nic.is_none() => {
                    "Public IP not associated with any NIC".to_string()
                }
                "Microsoft.Network/networkInterfaces" if r.attached_vm.is_none() => {
                    "NIC not attached to any VM".to_string()
                }
                "Microsoft.Network/networkSecurityGroups"
                    if r.attached_nic_count.unwrap_or(0) == 0
                        && r.attached_subnet_count.unwrap_or(0) == 0 =>
                {
                    "NSG not attached to any NIC or subnet".to_string()
                }
                "Microsoft.Compute/snapshots"
                    if r.age_days.unwrap_or(0) > self.snapshot_age_days =>
                {
                    format!(
                        "Snapshot is {} days old (threshold: {})",
                        r.age_days.unwrap_or(0),
                        self.snapshot_age_days
                    )
                }
                "Microsoft.Resources/resourceGroups" if r.resource_count.unwrap_or(0) == 0 => {
                    "Empty resource group, contains 0 resources".to_string()
                }
                _ => continue,
            };

            orphans.push(OrphanFinding {
                resource: r.name.clone(),
                resource_id: r.id.clone(),
                resource_type: r.resource_type.clone(),
                reason,
                monthly_cost: r.monthly_cost,
                created_date: r.created_date.clone(),
            });
        }

        orphans
    }
}

impl Default for OrphanDetector {
    fn default() -> Self {
        Self::new(90)
    }
}
