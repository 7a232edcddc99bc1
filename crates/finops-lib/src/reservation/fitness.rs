//! Reservation fitness scoring
//!
//! Scores workloads on five weighted factors. The composite lands in one
//! of three bands: reserve, savings plan, or stay on-demand.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Workload;
use crate::numeric::round1;

// Factor weights; the max weighted scores sum to 100.
const WEIGHT_UTILIZATION_STABILITY: f64 = 0.30;
const WEIGHT_RUNTIME_HOURS: f64 = 0.25;
const WEIGHT_WORKLOAD_LIFECYCLE: f64 = 0.20;
const WEIGHT_ENVIRONMENT: f64 = 0.15;
const WEIGHT_CRITICALITY: f64 = 0.10;

/// Hours in a full month of continuous runtime
const FULL_MONTH_HOURS: f64 = 730.0;

/// Composite score at or above which a reservation is recommended
const RESERVE_THRESHOLD: u32 = 70;

/// Composite score at or above which a savings plan is recommended
const SAVINGS_PLAN_THRESHOLD: u32 = 40;

/// Score for one fitness factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorScore {
    pub raw_score: u32,
    pub weighted_score: u32,
    pub max_weighted: u32,
    pub reason: String,
}

impl FactorScore {
    fn new(raw: u32, weight: f64, reason: String) -> Self {
        Self {
            raw_score: raw,
            weighted_score: (raw as f64 * weight).round() as u32,
            max_weighted: (100.0 * weight).round() as u32,
            reason,
        }
    }
}

/// Breakdown of all five factors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessFactors {
    pub utilization_stability: FactorScore,
    pub runtime_hours: FactorScore,
    pub workload_lifecycle: FactorScore,
    pub environment: FactorScore,
    pub criticality: FactorScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitnessRecommendation {
    Reserve,
    SavingsPlan,
    OnDemand,
}

/// Fitness assessment for one workload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessAssessment {
    pub resource: String,
    pub resource_id: String,
    pub resource_type: String,
    pub factors: FitnessFactors,
    pub fitness_score: u32,
    pub max_score: u32,
    pub recommendation: FitnessRecommendation,
    pub recommendation_detail: String,
}

/// Scores reservation fitness for candidate workloads
pub struct FitnessScorer;

impl FitnessScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one workload against the reference date
    pub fn score(&self, workload: &Workload, today: NaiveDate) -> FitnessAssessment {
        let factors = FitnessFactors {
            utilization_stability: score_utilization_stability(&workload.daily_utilization),
            runtime_hours: score_runtime_hours(workload.hours_per_month),
            workload_lifecycle: score_workload_lifecycle(
                workload.tags.get("ExpiryDate").map(String::as_str),
                workload.term_months,
                today,
            ),
            environment: score_environment(
                workload.tags.get("Environment").map(String::as_str),
            ),
            criticality: score_criticality(
                workload.tags.get("Criticality").map(String::as_str),
            ),
        };

        let fitness_score = factors.utilization_stability.weighted_score
            + factors.runtime_hours.weighted_score
            + factors.workload_lifecycle.weighted_score
            + factors.environment.weighted_score
            + factors.criticality.weighted_score;
        let max_score = factors.utilization_stability.max_weighted
            + factors.runtime_hours.max_weighted
            + factors.workload_lifecycle.max_weighted
            + factors.environment.max_weighted
            + factors.criticality.max_weighted;

        let (recommendation, recommendation_detail) = if fitness_score >= RESERVE_THRESHOLD {
            (
                FitnessRecommendation::Reserve,
                "1-year Reserved Instance recommended. Proceed to break-even analysis."
                    .to_string(),
            )
        } else if fitness_score >= SAVINGS_PLAN_THRESHOLD {
            (
                FitnessRecommendation::SavingsPlan,
                "Savings Plan recommended. Workload stability insufficient for RI lock-in."
                    .to_string(),
            )
        } else {
            (
                FitnessRecommendation::OnDemand,
                "Remain on-demand. Commitment risk exceeds discount benefit.".to_string(),
            )
        };

        FitnessAssessment {
            resource: workload.name.clone(),
            resource_id: workload.id.clone(),
            resource_type: workload.resource_type.clone(),
            factors,
            fitness_score,
            max_score,
            recommendation,
            recommendation_detail,
        }
    }
}

impl Default for FitnessScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Low variance over the window scores high: a workload that runs at 80%
/// every day is a better reservation bet than one bouncing 20-95%.
fn score_utilization_stability(daily_utilization: &[f64]) -> FactorScore {
    if daily_utilization.len() < 7 {
        return FactorScore::new(
            0,
            WEIGHT_UTILIZATION_STABILITY,
            "Insufficient data (need 7+ days)".to_string(),
        );
    }

    let n = daily_utilization.len() as f64;
    let avg = daily_utilization.iter().sum::<f64>() / n;
    let stdev = if daily_utilization.len() > 1 {
        let variance = daily_utilization
            .iter()
            .map(|v| (v - avg).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    // Coefficient of variation, lower is more stable
    let cv = if avg > 0.0 { stdev / avg * 100.0 } else { 100.0 };

    let raw = if cv < 10.0 {
        100
    } else if cv < 20.0 {
        85
    } else if cv < 30.0 {
        70
    } else if cv < 50.0 {
        50
    } else {
        25
    };

    let label = if cv < 20.0 {
        "stable"
    } else if cv < 40.0 {
        "moderate"
    } else {
        "volatile"
    };

    FactorScore::new(
        raw,
        WEIGHT_UTILIZATION_STABILITY,
        format!("CV={:.1}% ({})", round1(cv), label),
    )
}

fn score_runtime_hours(hours_per_month: f64) -> FactorScore {
    let pct = (hours_per_month / FULL_MONTH_HOURS * 100.0).min(100.0);

    let raw = if pct >= 95.0 {
        100
    } else if pct >= 80.0 {
        85
    } else if pct >= 60.0 {
        65
    } else if pct >= 40.0 {
        40
    } else {
        20
    };

    let label = if pct >= 95.0 {
        "24/7"
    } else if pct < 50.0 {
        "business hours"
    } else {
        "extended hours"
    };

    FactorScore::new(
        raw,
        WEIGHT_RUNTIME_HOURS,
        format!("{:.0}% runtime ({})", pct, label),
    )
}

/// A workload expected to outlive the RI term scores high; one expiring
/// before the term ends is a bad bet.
fn score_workload_lifecycle(
    expiry_date: Option<&str>,
    term_months: u32,
    today: NaiveDate,
) -> FactorScore {
    let Some(expiry) = expiry_date.filter(|v| !v.is_empty()) else {
        // No expiry set, assumed long-lived
        return FactorScore::new(
            90,
            WEIGHT_WORKLOAD_LIFECYCLE,
            "No expiry, assumed long-lived".to_string(),
        );
    };

    let Ok(expiry) = expiry.parse::<NaiveDate>() else {
        return FactorScore::new(
            60,
            WEIGHT_WORKLOAD_LIFECYCLE,
            format!("Unparseable expiry date `{}`", expiry),
        );
    };

    let remaining_months = (expiry.year() - today.year()) * 12
        + (expiry.month() as i32 - today.month() as i32);
    let term = term_months as f64;

    let raw = if remaining_months as f64 > term * 1.5 {
        100
    } else if remaining_months as f64 > term {
        80
    } else if remaining_months as f64 > term * 0.75 {
        50
    } else {
        // Expiry before the RI term ends
        10
    };

    FactorScore::new(
        raw,
        WEIGHT_WORKLOAD_LIFECYCLE,
        format!(
            "{} months remaining vs {}-month term",
            remaining_months, term_months
        ),
    )
}

fn score_environment(env: Option<&str>) -> FactorScore {
    let env = env.unwrap_or("unknown").to_lowercase();
    let raw = match env.as_str() {
        "production" => 100,
        "staging" => 60,
        "development" => 30,
        "test" => 20,
        "sandbox" => 10,
        _ => 40,
    };

    let reason = if env == "production" {
        "Production, commitment justified".to_string()
    } else {
        format!("{}, reduced commitment fitness", env)
    };

    FactorScore::new(raw, WEIGHT_ENVIRONMENT, reason)
}

fn score_criticality(crit: Option<&str>) -> FactorScore {
    let crit = crit
        .filter(|v| !v.is_empty())
        .unwrap_or("medium")
        .to_lowercase();
    let raw = match crit.as_str() {
        "critical" => 100,
        "high" => 80,
        "medium" => 60,
        "low" => 30,
        _ => 50,
    };

    FactorScore::new(raw, WEIGHT_CRITICALITY, format!("{} criticality", crit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn workload(
        utilization: Vec<f64>,
        hours: f64,
        tags: &[(&str, &str)],
    ) -> Workload {
        Workload {
            name: "db-primary".to_string(),
            id: "/resources/db-primary".to_string(),
            resource_type: "virtualMachines".to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            daily_utilization: utilization,
            hours_per_month: hours,
            term_months: 12,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_stable_production_workload_reserves() {
        let w = workload(
            vec![80.0; 30],
            730.0,
            &[("Environment", "production"), ("Criticality", "critical")],
        );

        let assessment = FitnessScorer::new().score(&w, today());
        // 30 + 25 + 18 + 15 + 10 = 98
        assert_eq!(assessment.fitness_score, 98);
        assert_eq!(assessment.max_score, 100);
        assert_eq!(assessment.recommendation, FitnessRecommendation::Reserve);
    }

    #[test]
    fn test_volatile_sandbox_stays_on_demand() {
        let mut utilization = Vec::new();
        for i in 0..30 {
            utilization.push(if i % 2 == 0 { 5.0 } else { 95.0 });
        }
        let w = workload(
            utilization,
            100.0,
            &[("Environment", "sandbox"), ("Criticality", "low")],
        );

        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.recommendation, FitnessRecommendation::OnDemand);
    }

    #[test]
    fn test_insufficient_utilization_data_scores_zero() {
        let w = workload(vec![80.0; 3], 730.0, &[]);
        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.factors.utilization_stability.weighted_score, 0);
        assert!(assessment
            .factors
            .utilization_stability
            .reason
            .contains("Insufficient data"));
    }

    #[test]
    fn test_expiry_before_term_scores_low() {
        let w = workload(
            vec![80.0; 30],
            730.0,
            &[("ExpiryDate", "2026-06-01"), ("Environment", "production")],
        );

        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.factors.workload_lifecycle.raw_score, 10);
    }

    #[test]
    fn test_expiry_well_past_term_scores_full() {
        let w = workload(vec![80.0; 30], 730.0, &[("ExpiryDate", "2028-06-01")]);
        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.factors.workload_lifecycle.raw_score, 100);
    }

    #[test]
    fn test_unparseable_expiry_scores_middle() {
        let w = workload(vec![80.0; 30], 730.0, &[("ExpiryDate", "someday")]);
        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.factors.workload_lifecycle.raw_score, 60);
    }

    #[test]
    fn test_missing_criticality_defaults_to_medium() {
        let w = workload(vec![80.0; 30], 730.0, &[]);
        let assessment = FitnessScorer::new().score(&w, today());
        assert_eq!(assessment.factors.criticality.raw_score, 60);
    }
}
