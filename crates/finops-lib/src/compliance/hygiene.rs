//! Tag hygiene scanning
//!
//! Finds tags that point at nothing: Owner values missing from the user
//! directory, review dates that have lapsed, and expiry dates in the past.
//! Unparseable dates are skipped rather than reported.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{DirectoryUser, ResourceRecord};

/// Team names accepted as owners alongside directory users
const ACCEPTED_TEAMS: &[&str] = &[
    "platform-team",
    "security-team",
    "data-team",
    "dev-team",
    "unattributed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HygieneSeverity {
    Medium,
    High,
}

/// What exactly is stale about the tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HygieneIssue {
    OrphanOwner {
        owner_tag: String,
    },
    OverdueReview {
        review_date: NaiveDate,
        days_overdue: i64,
    },
    PastExpiry {
        expiry_date: NaiveDate,
        days_past: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HygieneFinding {
    pub resource: String,
    pub resource_id: String,
    #[serde(flatten)]
    pub issue: HygieneIssue,
    pub severity: HygieneSeverity,
}

/// Scans the inventory for stale or orphaned governance tags
pub struct HygieneScanner {
    pub accepted_teams: Vec<String>,
}

impl HygieneScanner {
    pub fn new() -> Self {
        Self {
            accepted_teams: ACCEPTED_TEAMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Find Owner tags that resolve to nobody in the directory
    pub fn scan_owners(
        &self,
        resources: &[ResourceRecord],
        directory: &[DirectoryUser],
    ) -> Vec<HygieneFinding> {
        let mut valid: BTreeSet<String> = directory
            .iter()
            .filter_map(|u| u.user_principal_name.split('@').next())
            .filter(|p| !p.is_empty())
            .map(|p| p.to_lowercase())
            .collect();
        valid.extend(
            directory
                .iter()
                .filter(|u| !u.display_name.is_empty())
                .map(|u| u.display_name.to_lowercase().replace(' ', ".")),
        );
        valid.extend(self.accepted_teams.iter().map(|t| t.to_lowercase()));

        resources
            .iter()
            .filter_map(|r| {
                let owner = r.tag("Owner")?;
                if valid.contains(&owner.to_lowercase()) {
                    return None;
                }
                Some(HygieneFinding {
                    resource: r.name.clone(),
                    resource_id: r.id.clone(),
                    issue: HygieneIssue::OrphanOwner {
                        owner_tag: owner.to_string(),
                    },
                    severity: HygieneSeverity::High,
                })
            })
            .collect()
    }

    /// Find resources past their ReviewDate or ExpiryDate
    pub fn scan_dates(&self, resources: &[ResourceRecord], today: NaiveDate) -> Vec<HygieneFinding> {
        let mut findings = Vec::new();

        for r in resources {
            if let Some(review) = r.tag("ReviewDate").and_then(parse_date) {
                if review < today {
                    findings.push(HygieneFinding {
                        resource: r.name.clone(),
                        resource_id: r.id.clone(),
                        issue: HygieneIssue::OverdueReview {
                            review_date: review,
                            days_overdue: (today - review).num_days(),
                        },
                        severity: HygieneSeverity::Medium,
                    });
                }
            }

            if let Some(expiry) = r.tag("ExpiryDate").and_then(parse_date) {
                if expiry < today {
                    findings.push(HygieneFinding {
                        resource: r.name.clone(),
                        resource_id: r.id.clone(),
                        issue: HygieneIssue::PastExpiry {
                            expiry_date: expiry,
                            days_past: (today - expiry).num_days(),
                        },
                        severity: HygieneSeverity::High,
                    });
                }
            }
        }

        findings
    }

    /// Run both scans; owner validation only happens when a directory is
    /// available
    pub fn scan(
        &self,
        resources: &[ResourceRecord],
        directory: Option<&[DirectoryUser]>,
        today: NaiveDate,
    ) -> Vec<HygieneFinding> {
        let mut findings = Vec::new();
        if let Some(directory) = directory {
            findings.extend(self.scan_owners(resources, directory));
        }
        findings.extend(self.scan_dates(resources, today));
        findings
    }
}

impl Default for HygieneScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn resource(name: &str, tags: &[(&str, &str)]) -> ResourceRecord {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "tags": tags.iter().cloned().collect::<BTreeMap<_, _>>(),
        }))
        .unwrap()
    }

    fn user(upn: &str, display: &str) -> DirectoryUser {
        DirectoryUser {
            user_principal_name: upn.to_string(),
            display_name: display.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_owner_in_directory_is_clean() {
        let resources = vec![resource("vm", &[("Owner", "alice.smith")])];
        let directory = vec![user("alice.smith@corp.example", "Alice Smith")];

        let findings = HygieneScanner::new().scan_owners(&resources, &directory);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_orphan_owner_flagged() {
        let resources = vec![resource("vm", &[("Owner", "ghost.user")])];
        let directory = vec![user("alice.smith@corp.example", "Alice Smith")];

        let findings = HygieneScanner::new().scan_owners(&resources, &directory);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, HygieneSeverity::High);
        match &findings[0].issue {
            HygieneIssue::OrphanOwner { owner_tag } => assert_eq!(owner_tag, "ghost.user"),
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_team_owner_accepted() {
        let resources = vec![resource("vm", &[("Owner", "Platform-Team")])];
        let findings = HygieneScanner::new().scan_owners(&resources, &[]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_overdue_and_expired_dates() {
        let resources = vec![resource(
            "vm",
            &[("ReviewDate", "2026-01-01"), ("ExpiryDate", "2026-02-15")],
        )];

        let findings = HygieneScanner::new().scan_dates(&resources, today());
        assert_eq!(findings.len(), 2);
        match &findings[0].issue {
            HygieneIssue::OverdueReview { days_overdue, .. } => assert_eq!(*days_overdue, 59),
            other => panic!("unexpected issue: {:?}", other),
        }
        match &findings[1].issue {
            HygieneIssue::PastExpiry { days_past, .. } => assert_eq!(*days_past, 14),
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_future_dates_and_garbage_skipped() {
        let resources = vec![
            resource("future", &[("ReviewDate", "2027-01-01")]),
            resource("garbage", &[("ExpiryDate", "next-tuesday")]),
        ];

        let findings = HygieneScanner::new().scan_dates(&resources, today());
        assert!(findings.is_empty());
    }
}
