//! Waste scanning commands

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use finops_lib::models::ResourceInventory;
use finops_lib::waste::{
    OrphanDetector, WasteCategory, WasteScanReport, WasteScanner, WasteThresholds,
};

use crate::loader;
use crate::output::{self, format_currency, OutputFormat};

/// Row for the orphan findings table
#[derive(Tabled)]
struct OrphanRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Monthly Cost")]
    monthly_cost: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Full five-category waste scan
pub fn scan(
    resources: &Path,
    thresholds: Option<PathBuf>,
    output_path: Option<PathBuf>,
    defaults: &WasteThresholds,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let inventory: ResourceInventory = loader::load_json(resources)?;
    let thresholds = match thresholds {
        Some(path) => loader::load_json::<WasteThresholds>(&path)?,
        None => defaults.clone(),
    };

    let report = WasteScanner::new(thresholds).run_full_scan(&inventory.resources, as_of);

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Table => render_scan(&report),
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &report)?;
        output::print_success(&format!("Results written to {}", path.display()));
    }

    Ok(())
}

fn render_scan(report: &WasteScanReport) {
    output::print_header("Waste Scan Results");
    println!("Scan date:              {}", report.scan_date);
    println!("Resources scanned:      {}", report.resources_scanned);
    println!("Findings:               {}", report.total_findings);
    println!();

    for finding in &report.findings {
        let category = match finding.category {
            WasteCategory::Idle => "IDLE".yellow().to_string(),
            WasteCategory::Rightsizing => "RIGHTSIZING".cyan().to_string(),
            WasteCategory::Orphan => "ORPHAN".red().to_string(),
            WasteCategory::Schedule => "SCHEDULE".blue().to_string(),
            WasteCategory::Aged => "AGED".magenta().to_string(),
        };
        println!("[{}] {} ({})", category, finding.resource.bold(), finding.finding_id);
        println!("    {}", finding.reason);
        let disposition = format!("{:?}", finding.recommended_disposition).to_lowercase();
        let mut details = format!("Disposition: {}", disposition);
        if finding.monthly_cost > 0.0 {
            details.push_str(&format!(" | {}/mo", format_currency(finding.monthly_cost)));
        }
        if let Some(savings) = finding.monthly_savings.or(finding.potential_savings) {
            details.push_str(&format!(" | save {}/mo", format_currency(savings)));
        }
        println!("    {}", details);
        println!();
    }

    let s = &report.savings_summary;
    output::print_divider("Savings Summary");
    println!(
        "Confirmed (idle + orphan):   {}/month",
        format_currency(s.confirmed)
    );
    println!(
        "Right-sizing:                {}/month",
        format_currency(s.rightsizing)
    );
    println!(
        "Schedule (estimated):        {}/month",
        format_currency(s.schedule_estimated)
    );
    println!(
        "{} {}/month ({}/year)",
        "Total potential:".bold(),
        format_currency(s.total_potential).green().bold(),
        format_currency(s.total_potential * 12.0)
    );
}

/// Standalone orphan detection
pub fn orphans(
    resources: &Path,
    output_path: Option<PathBuf>,
    snapshot_age_days: u32,
    format: OutputFormat,
) -> Result<()> {
    let inventory: ResourceInventory = loader::load_json(resources)?;
    let findings = OrphanDetector::new(snapshot_age_days).detect(&inventory.resources);

    match format {
        OutputFormat::Json => output::print_json(&findings)?,
        OutputFormat::Table => {
            output::print_header("Orphan Resource Detection");
            println!("Resources scanned:      {}", inventory.resources.len());
            println!();

            let rows: Vec<OrphanRow> = findings
                .iter()
                .map(|f| OrphanRow {
                    resource: f.resource.clone(),
                    resource_type: f.resource_type.clone(),
                    monthly_cost: format_currency(f.monthly_cost),
                    reason: f.reason.clone(),
                })
                .collect();
            output::print_table(&rows);
            println!();

            let total: f64 = findings.iter().map(|f| f.monthly_cost).sum();
            println!(
                "Orphans: {} | Monthly cost: {}",
                findings.len(),
                format_currency(total).red()
            );
        }
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &findings)?;
        output::print_success(&format!("Results written to {}", path.display()));
    }

    Ok(())
}
