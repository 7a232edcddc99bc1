//! Reservation analysis
//!
//! This module provides:
//! - Fitness scoring of workloads as reservation candidates
//! - Break-even and early-decommission risk modeling for quoted terms
//! - Coverage reporting over the active reservation register

mod breakeven;
mod coverage;
mod fitness;

pub use breakeven::{BreakEvenAnalysis, BreakEvenCalculator, RiskScenario, RiskVerdict, TermAnalysis};
pub use coverage::{CoverageReport, CoverageSummary, ReservationStatus, UtilizationBand};
pub use fitness::{
    FactorScore, FitnessAssessment, FitnessFactors, FitnessRecommendation, FitnessScorer,
};
