//! Tag compliance scoring
//!
//! Coverage of the required and recommended tag sets across the inventory.
//! A tag counts as present only when its value is non-empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ResourceRecord;
use crate::numeric::round1;

/// Tags every resource must carry
pub const REQUIRED_TAGS: &[&str] = &["Owner", "Environment", "CostCenter", "Project"];

/// Tags resources should carry
pub const RECOMMENDED_TAGS: &[&str] = &[
    "Criticality",
    "DataClassification",
    "CreatedDate",
    "ReviewDate",
    "ExpiryDate",
    "ManagedBy",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("no resources found in inventory")]
    EmptyInventory,
}

/// Coverage of one tag across the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCoverage {
    pub tag: String,
    pub tagged: usize,
    pub total: usize,
    pub percent: f64,
}

/// Coverage of a tag set, with the aggregate over all tag slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceGroup {
    pub aggregate_percent: f64,
    pub per_tag: Vec<TagCoverage>,
}

/// Full compliance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub total_resources: usize,
    pub required: ComplianceGroup,
    pub recommended: ComplianceGroup,
}

/// Scores tag coverage against configurable tag sets
pub struct ComplianceAnalyzer {
    pub required_tags: Vec<String>,
    pub recommended_tags: Vec<String>,
}

impl ComplianceAnalyzer {
    pub fn new() -> Self {
        Self {
            required_tags: REQUIRED_TAGS.iter().map(|t| t.to_string()).collect(),
            recommended_tags: RECOMMENDED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Override the required tag set
    pub fn with_required_tags(mut self, tags: Vec<String>) -> Self {
        self.required_tags = tags;
        self
    }

    /// Analyze tag compliance across the inventory
    pub fn analyze(&self, resources: &[ResourceRecord]) -> Result<ComplianceReport, ComplianceError> {
        if resources.is_empty() {
            return Err(ComplianceError::EmptyInventory);
        }

        Ok(ComplianceReport {
            total_resources: resources.len(),
            required: group_coverage(resources, &self.required_tags),
            recommended: group_coverage(resources, &self.recommended_tags),
        })
    }
}

impl Default for ComplianceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn group_coverage(resources: &[ResourceRecord], tags: &[String]) -> ComplianceGroup {
    let total = resources.len();
    let per_tag: Vec<TagCoverage> = tags
        .iter()
        .map(|tag| {
            let tagged = resources.iter().filter(|r| r.tag(tag).is_some()).count();
            TagCoverage {
                tag: tag.clone(),
                tagged,
                total,
                percent: round1(tagged as f64 / total as f64 * 100.0),
            }
        })
        .collect();

    let total_slots = total * tags.len();
    let filled: usize = per_tag.iter().map(|c| c.tagged).sum();
    let aggregate_percent = if total_slots > 0 {
        round1(filled as f64 / total_slots as f64 * 100.0)
    } else {
        0.0
    };

    ComplianceGroup {
        aggregate_percent,
        per_tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn resource(tags: &[(&str, &str)]) -> ResourceRecord {
        serde_json::from_value(serde_json::json!({
            "name": "r",
            "tags": tags.iter().cloned().collect::<BTreeMap<_, _>>(),
        }))
        .unwrap()
    }

    #[test]
    fn test_per_tag_percentages() {
        let resources = vec![
            resource(&[("Owner", "alice"), ("CostCenter", "Eng")]),
            resource(&[("Owner", "bob")]),
            resource(&[]),
            resource(&[("Owner", "carol")]),
        ];

        let report = ComplianceAnalyzer::new().analyze(&resources).unwrap();
        let owner = report.required.per_tag.iter().find(|c| c.tag == "Owner").unwrap();
        assert_eq!(owner.tagged, 3);
        assert_eq!(owner.percent, 75.0);
        let cc = report
            .required
            .per_tag
            .iter()
            .find(|c| c.tag == "CostCenter")
            .unwrap();
        assert_eq!(cc.percent, 25.0);
    }

    #[test]
    fn test_aggregate_percent() {
        // 2 resources x 4 required tags = 8 slots, 4 filled
        let resources = vec![
            resource(&[("Owner", "a"), ("Environment", "prod"), ("CostCenter", "Eng"), ("Project", "p")]),
            resource(&[]),
        ];

        let report = ComplianceAnalyzer::new().analyze(&resources).unwrap();
        assert_eq!(report.required.aggregate_percent, 50.0);
    }

    #[test]
    fn test_empty_tag_value_does_not_count() {
        let resources = vec![resource(&[("Owner", "")])];
        let report = ComplianceAnalyzer::new().analyze(&resources).unwrap();
        let owner = report.required.per_tag.iter().find(|c| c.tag == "Owner").unwrap();
        assert_eq!(owner.tagged, 0);
    }

    #[test]
    fn test_empty_inventory_is_an_error() {
        let err = ComplianceAnalyzer::new().analyze(&[]).unwrap_err();
        assert_eq!(err, ComplianceError::EmptyInventory);
    }
}
