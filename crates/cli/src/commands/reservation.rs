//! Reservation analysis commands

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use finops_lib::models::{CandidateList, ReservationRegister, WorkloadList};
use finops_lib::reservation::{
    BreakEvenCalculator, CoverageReport, FitnessRecommendation, FitnessScorer, RiskVerdict,
    UtilizationBand,
};

use crate::loader;
use crate::output::{self, format_currency, OutputFormat};

/// Row for the fitness summary table
#[derive(Tabled)]
struct FitnessRow {
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
}

/// Score reservation fitness for candidate workloads
pub fn fitness(
    workloads: &Path,
    output_path: Option<PathBuf>,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let list: WorkloadList = loader::load_json(workloads)?;
    let scorer = FitnessScorer::new();
    let assessments: Vec<_> = list
        .workloads
        .iter()
        .map(|w| scorer.score(w, as_of))
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&assessments)?,
        OutputFormat::Table => {
            output::print_header("Reservation Fitness Scoring");
            println!("Candidates:             {}", assessments.len());
            println!();

            for a in &assessments {
                println!(
                    "{} [{}]: {}/{} {}",
                    a.resource.bold(),
                    a.resource_type,
                    a.fitness_score,
                    a.max_score,
                    color_recommendation(a.recommendation)
                );
                let factors = [
                    ("Utilization Stability", &a.factors.utilization_stability),
                    ("Runtime Hours", &a.factors.runtime_hours),
                    ("Workload Lifecycle", &a.factors.workload_lifecycle),
                    ("Environment", &a.factors.environment),
                    ("Criticality", &a.factors.criticality),
                ];
                for (label, factor) in factors {
                    println!(
                        "    {}: {}/{} ({})",
                        label, factor.weighted_score, factor.max_weighted, factor.reason
                    );
                }
                println!("    {}", a.recommendation_detail.dimmed());
                println!();
            }

            let rows: Vec<FitnessRow> = assessments
                .iter()
                .map(|a| FitnessRow {
                    workload: a.resource.clone(),
                    score: format!("{}/{}", a.fitness_score, a.max_score),
                    recommendation: color_recommendation(a.recommendation),
                })
                .collect();
            output::print_table(&rows);
        }
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &assessments)?;
        output::print_success(&format!("Results written to {}", path.display()));
    }

    Ok(())
}

fn color_recommendation(rec: FitnessRecommendation) -> String {
    match rec {
        FitnessRecommendation::Reserve => "RESERVE".green().to_string(),
        FitnessRecommendation::SavingsPlan => "SAVINGS_PLAN".yellow().to_string(),
        FitnessRecommendation::OnDemand => "ON_DEMAND".red().to_string(),
    }
}

/// Break-even analysis for quoted reservation terms
pub fn breakeven(
    candidates: &Path,
    output_path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let list: CandidateList = loader::load_json(candidates)?;
    let calculator = BreakEvenCalculator::new();
    let analyses: Vec<_> = list.candidates.iter().map(|c| calculator.analyze(c)).collect();

    match format {
        OutputFormat::Json => output::print_json(&analyses)?,
        OutputFormat::Table => {
            output::print_header("Break-Even Analysis");
            println!();

            for analysis in &analyses {
                output::print_divider(&analysis.resource);
                println!(
                    "On-demand: {}/month",
                    format_currency(analysis.on_demand_monthly)
                );

                for term in &analysis.terms {
                    println!(
                        "  {}-month RI: {}/month ({}% discount)",
                        term.term_months, format_currency(term.ri_monthly), term.discount_pct
                    );
                    println!(
                        "  Monthly savings: {}",
                        format_currency(term.monthly_savings)
                    );
                    match term.breakeven_month {
                        Some(month) => println!("  Break-even: Month {}", month),
                        None => output::print_warning("  Never breaks even"),
                    }
                    println!(
                        "  Total savings over term: {}",
                        format_currency(term.total_savings)
                    );
                    println!("  Risk scenarios:");
                    for scenario in &term.risk_scenarios {
                        let verdict = match scenario.verdict {
                            RiskVerdict::NetPositive => "NET POSITIVE".green().to_string(),
                            RiskVerdict::NetNegative => "NET NEGATIVE".red().to_string(),
                        };
                        println!(
                            "    Decommission month {}: net {} ({})",
                            scenario.decommission_month,
                            format_currency(scenario.net_position),
                            verdict
                        );
                    }
                    println!();
                }
            }
        }
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &analyses)?;
        output::print_success(&format!("Results written to {}", path.display()));
    }

    Ok(())
}

/// Coverage report over the reservation register
pub fn coverage(register: &Path, as_of: NaiveDate, format: OutputFormat) -> Result<()> {
    let register: ReservationRegister = loader::load_json(register)?;
    let summary = CoverageReport::new().build(&register.reservations, as_of);

    match format {
        OutputFormat::Json => output::print_json(&summary)?,
        OutputFormat::Table => {
            output::print_header("Reservation Coverage Report");
            println!("Active reservations:    {}", summary.reservations.len());
            println!();

            for r in &summary.reservations {
                let band = match r.utilization_band {
                    UtilizationBand::Healthy => "healthy".green().to_string(),
                    UtilizationBand::Moderate => "moderate".yellow().to_string(),
                    UtilizationBand::Low => "low".red().to_string(),
                };
                println!("{} [{}] ({})", r.name.bold(), r.reservation_type, band);
                println!(
                    "    Term: {} months | Utilization: {}",
                    r.term_months,
                    output::format_percent(r.utilization_pct)
                );
                println!(
                    "    Monthly cost: {} | On-demand equivalent: {} | Savings: {}",
                    format_currency(r.monthly_cost),
                    format_currency(r.on_demand_equivalent),
                    format_currency(r.monthly_savings)
                );
                if r.expiring_soon {
                    if let Some(days) = r.days_to_expiry {
                        output::print_warning(&format!(
                            "Expiring in {} days, renewal decision required",
                            days
                        ));
                    }
                }
                println!();
            }

            output::print_divider("Summary");
            println!(
                "Total monthly commitment: {}",
                format_currency(summary.total_monthly_commitment)
            );
            println!(
                "On-demand equivalent:     {}",
                format_currency(summary.total_on_demand_equivalent)
            );
            println!(
                "Monthly savings:          {}",
                format_currency(summary.total_monthly_savings).green()
            );
            println!(
                "Annual projected savings: {}",
                format_currency(summary.annual_projected_savings)
            );
            println!(
                "Coverage:                 {}",
                output::format_percent(summary.coverage_pct)
            );
        }
    }

    Ok(())
}
