//! Cost anomaly commands

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

use finops_lib::anomaly::{
    DayOverDayDetector, DayOverDaySpike, NewResourceCost, NewResourceDetector,
    ResourceSpikeScanner, RollingAverageDetector, RollingDeviation, SpikeFinding,
    WeekendAnomaly, WeekendDetector,
};
use finops_lib::models::{DailyCostSeries, ResourceCostReport};
use finops_lib::AnalysisConfig;

use crate::loader;
use crate::output::{self, format_currency, OutputFormat};

/// Combined output of the daily-series detectors
#[derive(Serialize)]
struct AnomalyReport {
    rolling: Vec<RollingDeviation>,
    day_over_day: Vec<DayOverDaySpike>,
    weekend: Vec<WeekendAnomaly>,
    new_resources: Vec<NewResourceCost>,
}

impl AnomalyReport {
    fn total(&self) -> usize {
        self.rolling.len() + self.day_over_day.len() + self.weekend.len() + self.new_resources.len()
    }
}

/// Run all daily-series detectors over a cost series
#[allow(clippy::too_many_arguments)]
pub fn detect(
    costs: &Path,
    rolling_threshold: Option<f64>,
    dod_threshold: Option<f64>,
    output_path: Option<PathBuf>,
    config: &AnalysisConfig,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let series: DailyCostSeries = loader::load_json(costs)?;
    let daily = &series.daily_costs;

    let rolling_threshold = rolling_threshold.unwrap_or(config.rolling_threshold_pct);
    let dod_threshold = dod_threshold.unwrap_or(config.dod_threshold_pct);

    let report = AnomalyReport {
        rolling: RollingAverageDetector::new(rolling_threshold).detect(daily),
        day_over_day: DayOverDayDetector::new(dod_threshold).detect(daily),
        weekend: WeekendDetector::new(config.weekend_multiplier).detect(daily),
        new_resources: NewResourceDetector::new(
            config.new_resource_daily_threshold,
            config.new_resource_lookback_days,
        )
        .detect(daily, as_of),
    };

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Table => render_detect(&report, daily.len(), rolling_threshold, dod_threshold),
    }

    if let Some(path) = output_path {
        loader::write_json(&path, &report)?;
        output::print_success(&format!("Findings written to {}", path.display()));
    }

    Ok(())
}

fn render_detect(
    report: &AnomalyReport,
    data_points: usize,
    rolling_threshold: f64,
    dod_threshold: f64,
) {
    output::print_header("Cost Anomaly Detection");
    println!("Data points:            {}", data_points);
    println!(
        "Thresholds:             rolling={}%, day-over-day={}%",
        rolling_threshold, dod_threshold
    );
    println!();

    output::print_divider("7-Day Rolling Average");
    if report.rolling.is_empty() {
        output::print_success("No anomalies detected");
    }
    for f in &report.rolling {
        println!(
            "[{}] {} on {}: {} vs 7-day avg {} (+{}%)",
            output::color_severity(&format!("{:?}", f.severity)),
            f.resource,
            f.date,
            format_currency(f.cost),
            format_currency(f.seven_day_avg),
            f.deviation_pct
        );
    }
    println!();

    output::print_divider("Day-over-Day Spike");
    if report.day_over_day.is_empty() {
        output::print_success("No anomalies detected");
    }
    for f in &report.day_over_day {
        println!(
            "[{}] {} on {}: {} vs previous day {} (+{}%)",
            output::color_severity(&format!("{:?}", f.severity)),
            f.resource,
            f.date,
            format_currency(f.cost),
            format_currency(f.previous_day),
            f.spike_pct
        );
    }
    println!();

    output::print_divider("Weekend Anomaly");
    if report.weekend.is_empty() {
        output::print_success("No anomalies detected");
    }
    for f in &report.weekend {
        println!(
            "{} on {}: weekend {} vs weekday avg {} ({}x)",
            f.resource,
            f.date,
            format_currency(f.weekend_cost),
            format_currency(f.weekday_avg),
            f.multiplier
        );
    }
    println!();

    output::print_divider("New Resource Cost");
    if report.new_resources.is_empty() {
        output::print_success("No anomalies detected");
    }
    for f in &report.new_resources {
        println!(
            "{} created {}: {}/day exceeds {}",
            f.resource,
            f.created_date,
            format_currency(f.daily_cost),
            format_currency(f.threshold)
        );
    }
    println!();

    println!("Total findings: {}", report.total());
}

/// Per-resource spike scan
pub fn spikes(
    resources: &Path,
    multiplier: Option<f64>,
    config: &AnalysisConfig,
    format: OutputFormat,
) -> Result<()> {
    let snapshot: ResourceCostReport = loader::load_json(resources)?;
    let multiplier = multiplier.unwrap_or(config.spike_multiplier);

    let findings = ResourceSpikeScanner::new(multiplier).scan(&snapshot.resources);

    match format {
        OutputFormat::Json => output::print_json(&findings)?,
        OutputFormat::Table => {
            output::print_header("Resource Spike Scan");
            println!("Resources scanned:      {}", snapshot.resources.len());
            println!("Threshold:              {}x 7-day average", multiplier);
            println!();

            if findings.is_empty() {
                output::print_success("No resource spikes detected");
            }
            for f in &findings {
                render_spike(f);
            }
            println!();
            println!("Spikes found: {}", findings.len());
        }
    }

    Ok(())
}

fn render_spike(f: &SpikeFinding) {
    println!(
        "[{}] {} [{}]",
        output::color_severity(&format!("{:?}", f.severity)),
        f.resource,
        f.owner
    );
    println!(
        "    Today: {} | 7-day avg: {} | {}x",
        format_currency(f.today_cost),
        format_currency(f.seven_day_avg),
        f.multiplier
    );
}
