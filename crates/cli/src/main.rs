//! Cloud Cost Governance CLI
//!
//! A command-line tool for allocating cloud spend across cost centers and
//! running the surrounding governance analytics: tag compliance, anomaly
//! detection, reservation analysis, and waste scanning.

mod commands;
mod loader;
mod output;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use finops_lib::AnalysisConfig;

/// Cloud Cost Governance CLI
#[derive(Parser)]
#[command(name = "finops")]
#[command(author, version, about = "CLI for the Cloud Cost Governance toolkit", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Reference date for age and expiry calculations (defaults to today)
    #[arg(long, global = true)]
    pub as_of: Option<NaiveDate>,

    /// Thresholds config file (can also be set via FINOPS_CONFIG env var)
    #[arg(long, env = "FINOPS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the cost allocation engine over an inventory snapshot
    Allocate {
        /// Resources with costs JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// Shared resources JSON
        #[arg(long, short)]
        shared: PathBuf,

        /// Shared cost rules JSON
        #[arg(long)]
        rules: PathBuf,

        /// Output allocation JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Render a Markdown showback report from a saved allocation
    Showback {
        /// Allocation output JSON
        #[arg(long, short)]
        allocation: PathBuf,

        /// Budget definitions JSON
        #[arg(long, short)]
        budgets: Option<PathBuf>,

        /// Output report path (.md)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Tag compliance and hygiene
    #[command(subcommand)]
    Compliance(ComplianceCommands),

    /// Cost anomaly detection
    #[command(subcommand)]
    Anomaly(AnomalyCommands),

    /// Reservation fitness, break-even, and coverage
    #[command(subcommand)]
    Reservation(ReservationCommands),

    /// Waste scanning
    #[command(subcommand)]
    Waste(WasteCommands),
}

#[derive(Subcommand)]
pub enum ComplianceCommands {
    /// Tag compliance report
    Report {
        /// Resource inventory JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// Output report JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Tag hygiene scan
    Hygiene {
        /// Resource inventory JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// User directory export JSON
        #[arg(long, short)]
        directory: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AnomalyCommands {
    /// Run all daily-series detectors
    Detect {
        /// Daily cost data JSON
        #[arg(long, short)]
        costs: PathBuf,

        /// 7-day rolling deviation threshold (percent)
        #[arg(long)]
        rolling_threshold: Option<f64>,

        /// Day-over-day spike threshold (percent)
        #[arg(long)]
        dod_threshold: Option<f64>,

        /// Output findings JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Per-resource spike scan
    Spikes {
        /// Resource cost data JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// Spike threshold multiplier
        #[arg(long, short)]
        multiplier: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum ReservationCommands {
    /// Score workloads on reservation fitness
    Fitness {
        /// Workloads JSON
        #[arg(long, short)]
        workloads: PathBuf,

        /// Output results JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Break-even analysis for quoted terms
    Breakeven {
        /// Candidates JSON
        #[arg(long, short)]
        candidates: PathBuf,

        /// Output results JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Coverage report over the reservation register
    Coverage {
        /// Reservation register JSON
        #[arg(long, short)]
        register: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum WasteCommands {
    /// Full five-category waste scan
    Scan {
        /// Resources JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// Custom thresholds JSON
        #[arg(long, short)]
        thresholds: Option<PathBuf>,

        /// Output findings JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Standalone orphan detection
    Orphans {
        /// Resources JSON
        #[arg(long, short)]
        resources: PathBuf,

        /// Output findings JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AnalysisConfig::load_with_file(cli.config.as_deref())?;
    let as_of = cli.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match cli.command {
        Commands::Allocate {
            resources,
            shared,
            rules,
            output,
        } => {
            commands::allocate::run(
                &resources,
                &shared,
                &rules,
                output,
                config.precision,
                as_of,
                cli.format,
            )?;
        }
        Commands::Showback {
            allocation,
            budgets,
            output,
        } => {
            commands::showback::run(&allocation, budgets, output)?;
        }
        Commands::Compliance(compliance_cmd) => match compliance_cmd {
            ComplianceCommands::Report { resources, output } => {
                commands::compliance::report(&resources, output, cli.format)?;
            }
            ComplianceCommands::Hygiene {
                resources,
                directory,
            } => {
                commands::compliance::hygiene(&resources, directory, as_of, cli.format)?;
            }
        },
        Commands::Anomaly(anomaly_cmd) => match anomaly_cmd {
            AnomalyCommands::Detect {
                costs,
                rolling_threshold,
                dod_threshold,
                output,
            } => {
                commands::anomaly::detect(
                    &costs,
                    rolling_threshold,
                    dod_threshold,
                    output,
                    &config,
                    as_of,
                    cli.format,
                )?;
            }
            AnomalyCommands::Spikes {
                resources,
                multiplier,
            } => {
                commands::anomaly::spikes(&resources, multiplier, &config, cli.format)?;
            }
        },
        Commands::Reservation(reservation_cmd) => match reservation_cmd {
            ReservationCommands::Fitness { workloads, output } => {
                commands::reservation::fitness(&workloads, output, as_of, cli.format)?;
            }
            ReservationCommands::Breakeven { candidates, output } => {
                commands::reservation::breakeven(&candidates, output, cli.format)?;
            }
            ReservationCommands::Coverage { register } => {
                commands::reservation::coverage(&register, as_of, cli.format)?;
            }
        },
        Commands::Waste(waste_cmd) => match waste_cmd {
            WasteCommands::Scan {
                resources,
                thresholds,
                output,
            } => {
                commands::waste::scan(
                    &resources,
                    thresholds,
                    output,
                    &config.waste,
                    as_of,
                    cli.format,
                )?;
            }
            WasteCommands::Orphans { resources, output } => {
                commands::waste::orphans(
                    &resources,
                    output,
                    config.waste.orphan_snapshot_days,
                    cli.format,
                )?;
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
