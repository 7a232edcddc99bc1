//! Tag compliance and hygiene commands

use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use finops_lib::compliance::{
    ComplianceAnalyzer, ComplianceGroup, HygieneFinding, HygieneIssue, HygieneScanner,
};
use finops_lib::models::{ResourceInventory, UserDirectory};

use crate::loader;
use crate::output::{self, OutputFormat};

/// Row for the tag coverage table
#[derive(Tabled)]
struct CoverageRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Coverage")]
    coverage: String,
    #[tabled(rename = "Tagged")]
    tagged: String,
    #[tabled(rename = "")]
    bar: String,
}

/// Tag compliance report
pub fn report(resources: &Path, output_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let inventory: ResourceInventory = loader::load_json(resources)?;
    let report = ComplianceAnalyzer::new().analyze(&inventory.resources)?;

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Table => {
            output::print_header("Tag Compliance Report");
            println!("Resources:              {}", report.total_resources);
            println!();

            render_group("Required Tags", &report.required);
            render_group("Recommended Tags", &report.recommended);
        }
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &report)?;
        output::print_success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

fn render_group(title: &str, group: &ComplianceGroup) {
    output::print_divider(&format!(
        "{} (aggregate {})",
        title,
        output::format_percent(group.aggregate_percent)
    ));
    let rows: Vec<CoverageRow> = group
        .per_tag
        .iter()
        .map(|c| CoverageRow {
            tag: c.tag.clone(),
            coverage: output::format_percent(c.percent),
            tagged: format!("{}/{}", c.tagged, c.total),
            bar: coverage_bar(c.percent),
        })
        .collect();
    output::print_table(&rows);
    println!();
}

/// 20-segment coverage bar
fn coverage_bar(percent: f64) -> String {
    let filled = (percent / 5.0) as usize;
    let filled = filled.min(20);
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

/// Tag hygiene scan
pub fn hygiene(
    resources: &Path,
    directory: Option<PathBuf>,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let inventory: ResourceInventory = loader::load_json(resources)?;
    let directory = directory
        .map(|path| loader::load_json::<UserDirectory>(&path))
        .transpose()?;

    let findings = HygieneScanner::new().scan(
        &inventory.resources,
        directory.as_ref().map(|d| d.users.as_slice()),
        as_of,
    );

    match format {
        OutputFormat::Json => output::print_json(&findings)?,
        OutputFormat::Table => {
            output::print_header("Tag Hygiene Scan");
            println!("Resources scanned:      {}", inventory.resources.len());
            println!();

            if findings.is_empty() {
                output::print_success("No hygiene findings");
            } else {
                for finding in &findings {
                    render_finding(finding);
                }
            }
            println!();
            println!("Findings: {}", findings.len());
        }
    }

    Ok(())
}

fn render_finding(finding: &HygieneFinding) {
    let severity = output::color_severity(&format!("{:?}", finding.severity).to_uppercase());
    match &finding.issue {
        HygieneIssue::OrphanOwner { owner_tag } => {
            println!(
                "[{}] {}: Owner `{}` not found in directory",
                severity, finding.resource, owner_tag
            );
        }
        HygieneIssue::OverdueReview {
            review_date,
            days_overdue,
        } => {
            println!(
                "[{}] {}: ReviewDate {} is {} days overdue",
                severity, finding.resource, review_date, days_overdue
            );
        }
        HygieneIssue::PastExpiry {
            expiry_date,
            days_past,
        } => {
            println!(
                "[{}] {}: ExpiryDate {} passed {} days ago",
                severity, finding.resource, expiry_date, days_past
            );
        }
    }
}
