//! Cost allocation command

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use finops_lib::allocation::{AllocationReport, CostAllocator};
use finops_lib::models::{ResourceInventory, RuleSet, SharedResourceList};

use crate::loader;
use crate::output::{self, format_currency, OutputFormat};

/// Row for the fully-loaded cost table
#[derive(Tabled)]
struct CostCenterRow {
    #[tabled(rename = "Cost Center")]
    cost_center: String,
    #[tabled(rename = "Direct")]
    direct: String,
    #[tabled(rename = "Shared")]
    shared: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "% of Spend")]
    percent: String,
}

/// Run the allocation engine over the three input documents
#[allow(clippy::too_many_arguments)]
pub fn run(
    resources: &Path,
    shared: &Path,
    rules: &Path,
    output_path: Option<PathBuf>,
    precision: u32,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let inventory: ResourceInventory = loader::load_json(resources)?;
    let shared_list: SharedResourceList = loader::load_json(shared)?;
    let rule_set: RuleSet = loader::load_json(rules)?;

    let allocator = CostAllocator::new().with_precision(precision);
    let report = allocator.run(
        &inventory.resources,
        &shared_list.shared_resources,
        &rule_set.rules,
        as_of,
    )?;

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Table => render(&report),
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &report)?;
        output::print_success(&format!("Allocation written to {}", path.display()));
    }

    Ok(())
}

fn render(report: &AllocationReport) {
    output::print_header("Cost Allocation");
    println!("Period:                 {}", report.allocation_date.cyan());
    println!();

    output::print_divider("Layer 1: Direct Attribution");
    for (cc, data) in &report.direct.by_cost_center {
        println!(
            "{}: {} ({} resources)",
            cc,
            format_currency(data.direct),
            data.resources.len()
        );
    }
    println!(
        "Untagged quarantine: {} ({} resources)",
        format_currency(report.direct.untagged.total).yellow(),
        report.direct.untagged.resources.len()
    );
    println!();

    output::print_divider("Layer 2: Shared Distribution");
    for (name, outcome) in &report.shared_distributions {
        match outcome.allocation() {
            Some(alloc) => {
                let shares = alloc
                    .allocation
                    .iter()
                    .map(|(cc, amount)| format!("{}: {}", cc, format_currency(*amount)))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "{} ({}, {}): {}",
                    name,
                    format_currency(alloc.total_cost),
                    alloc.method,
                    shares
                );
                if alloc.is_degenerate() {
                    output::print_warning(&format!(
                        "{} assigned no shares despite non-zero cost",
                        name
                    ));
                }
            }
            None => {
                output::print_warning(&format!(
                    "{}: {}",
                    name,
                    outcome.error().unwrap_or("distribution failed")
                ));
            }
        }
    }
    println!();

    output::print_divider("Fully Loaded Cost");
    let fully_loaded = &report.fully_loaded;
    let rows: Vec<CostCenterRow> = fully_loaded
        .cost_centers
        .iter()
        .map(|(cc, cost)| {
            let pct = if fully_loaded.grand_total > 0.0 {
                cost.total / fully_loaded.grand_total * 100.0
            } else {
                0.0
            };
            CostCenterRow {
                cost_center: cc.clone(),
                direct: format_currency(cost.direct),
                shared: format_currency(cost.shared),
                total: format_currency(cost.total),
                percent: output::format_percent(pct),
            }
        })
        .collect();
    output::print_table(&rows);
    println!();

    println!(
        "Quarantine:             {}",
        format_currency(fully_loaded.untagged_quarantine).yellow()
    );
    println!(
        "{}  {}",
        "Grand total:".bold(),
        format_currency(fully_loaded.grand_total).green().bold()
    );
    println!("Leakage:                {}", format_currency(fully_loaded.leakage));
}
