//! Reservation break-even modeling
//!
//! Calculates when a reservation pays for itself and the net position if
//! the workload is decommissioned before the term ends.

use serde::{Deserialize, Serialize};

use crate::models::{BreakEvenCandidate, TermQuote};
use crate::numeric::round2;

/// Decommission checkpoints for 1-year terms
const CHECKPOINTS_12M: &[u32] = &[3, 6, 9, 12];

/// Decommission checkpoints for longer terms
const CHECKPOINTS_LONG: &[u32] = &[6, 12, 18, 24, 30, 36];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskVerdict {
    NetPositive,
    NetNegative,
}

/// Net position if the workload is decommissioned at a given month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScenario {
    pub decommission_month: u32,
    pub savings_to_date: f64,
    pub wasted_commitment: f64,
    pub net_position: f64,
    pub verdict: RiskVerdict,
}

/// Break-even analysis for one quoted term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermAnalysis {
    pub term_months: u32,
    pub ri_monthly: f64,
    pub upfront: f64,
    pub discount_pct: f64,
    pub monthly_savings: f64,
    pub total_savings: f64,
    /// Month at which cumulative savings cover the upfront cost;
    /// `None` when the term never saves money
    pub breakeven_month: Option<u32>,
    pub risk_scenarios: Vec<RiskScenario>,
}

/// Break-even analysis for one candidate across all quoted terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenAnalysis {
    pub resource: String,
    pub on_demand_monthly: f64,
    pub terms: Vec<TermAnalysis>,
}

/// Models reservation break-even and early-decommission risk
pub struct BreakEvenCalculator;

impl BreakEvenCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, candidate: &BreakEvenCandidate) -> BreakEvenAnalysis {
        BreakEvenAnalysis {
            resource: candidate.name.clone(),
            on_demand_monthly: candidate.on_demand_monthly,
            terms: candidate
                .terms
                .iter()
                .map(|term| analyze_term(candidate.on_demand_monthly, term))
                .collect(),
        }
    }
}

impl Default for BreakEvenCalculator {
    fn default() -> Self {
        Self::new()
    }
}

fn analyze_term(on_demand_monthly: f64, term: &TermQuote) -> TermAnalysis {
    let term_months = term.months;
    let monthly_savings = on_demand_monthly - term.ri_monthly;
    let total_commitment = term.ri_monthly * term_months as f64 + term.upfront;
    let total_on_demand = on_demand_monthly * term_months as f64;
    let total_savings = total_on_demand - total_commitment;

    let breakeven_month = if term.upfront > 0.0 && monthly_savings > 0.0 {
        Some((term.upfront / monthly_savings).ceil() as u32)
    } else if monthly_savings > 0.0 {
        // No upfront cost, savings start immediately
        Some(1)
    } else {
        None
    };

    let checkpoints = if term_months == 12 {
        CHECKPOINTS_12M
    } else {
        CHECKPOINTS_LONG
    };

    let risk_scenarios = checkpoints
        .iter()
        .filter(|month| **month <= term_months)
        .map(|&month| {
            let savings_at_n = monthly_savings * month as f64 - term.upfront;
            let wasted_commitment = term.ri_monthly * (term_months - month) as f64;
            let net = savings_at_n - wasted_commitment;
            RiskScenario {
                decommission_month: month,
                savings_to_date: round2(savings_at_n),
                wasted_commitment: round2(wasted_commitment),
                net_position: round2(net),
                verdict: if net > 0.0 {
                    RiskVerdict::NetPositive
                } else {
                    RiskVerdict::NetNegative
                },
            }
        })
        .collect();

    TermAnalysis {
        term_months,
        ri_monthly: term.ri_monthly,
        upfront: term.upfront,
        discount_pct: term.discount_pct,
        monthly_savings: round2(monthly_savings),
        total_savings: round2(total_savings),
        breakeven_month,
        risk_scenarios,
    }
}
