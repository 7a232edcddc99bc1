//! Tag compliance and hygiene analysis
//!
//! This module measures how well the inventory carries the governance tag
//! schema and flags tags that have gone stale: owners missing from the
//! directory, overdue review dates, and past expiry dates.

mod hygiene;
mod report;

pub use hygiene::{HygieneFinding, HygieneIssue, HygieneScanner, HygieneSeverity};
pub use report::{
    ComplianceAnalyzer, ComplianceError, ComplianceGroup, ComplianceReport, TagCoverage,
    RECOMMENDED_TAGS, REQUIRED_TAGS,
};
