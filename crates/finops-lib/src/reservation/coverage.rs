//! Reservation coverage reporting
//!
//! Summarizes the active reservation register: utilization health,
//! approaching expiries, and the commitment-vs-on-demand coverage ratio.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Reservation;
use crate::numeric::{round1, round2};

/// Days before expiry at which a renewal decision is flagged
const EXPIRY_WARNING_DAYS: i64 = 90;

/// Utilization health bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationBand {
    Healthy,
    Moderate,
    Low,
}

impl UtilizationBand {
    fn from_pct(pct: f64) -> Self {
        if pct >= 80.0 {
            UtilizationBand::Healthy
        } else if pct >= 60.0 {
            UtilizationBand::Moderate
        } else {
            UtilizationBand::Low
        }
    }
}

/// Status of one reservation in the register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatus {
    pub name: String,
    pub reservation_type: String,
    pub term_months: u32,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub monthly_cost: f64,
    pub on_demand_equivalent: f64,
    pub utilization_pct: f64,
    pub monthly_savings: f64,
    pub utilization_band: UtilizationBand,
    pub days_to_expiry: Option<i64>,
    /// Renewal decision required within the warning window
    pub expiring_soon: bool,
}

/// Register-wide coverage summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub reservations: Vec<ReservationStatus>,
    pub total_monthly_commitment: f64,
    pub total_monthly_savings: f64,
    pub total_on_demand_equivalent: f64,
    pub annual_projected_savings: f64,
    pub coverage_pct: f64,
}

/// Builds coverage summaries from the reservation register
pub struct CoverageReport;

impl CoverageReport {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, reservations: &[Reservation], today: NaiveDate) -> CoverageSummary {
        let statuses: Vec<ReservationStatus> = reservations
            .iter()
            .map(|r| {
                let days_to_expiry = r.expiry_date.map(|expiry| (expiry - today).num_days());
                ReservationStatus {
                    name: r.name.clone(),
                    reservation_type: r.reservation_type.clone(),
                    term_months: r.term_months,
                    purchase_date: r.purchase_date,
                    expiry_date: r.expiry_date,
                    monthly_cost: r.monthly_cost,
                    on_demand_equivalent: r.on_demand_equivalent,
                    utilization_pct: r.utilization_pct,
                    monthly_savings: r.monthly_savings,
                    utilization_band: UtilizationBand::from_pct(r.utilization_pct),
                    days_to_expiry,
                    expiring_soon: days_to_expiry
                        .map(|d| d <= EXPIRY_WARNING_DAYS)
                        .unwrap_or(false),
                }
            })
            .collect();

        let total_monthly_commitment =
            round2(reservations.iter().map(|r| r.monthly_cost).sum());
        let total_monthly_savings =
            round2(reservations.iter().map(|r| r.monthly_savings).sum());
        let total_on_demand_equivalent =
            round2(reservations.iter().map(|r| r.on_demand_equivalent).sum());
        let coverage_pct = if total_on_demand_equivalent > 0.0 {
            round1(total_monthly_commitment / total_on_demand_equivalent * 100.0)
        } else {
            0.0
        };

        CoverageSummary {
            reservations: statuses,
            total_monthly_commitment,
            total_monthly_savings,
            total_on_demand_equivalent,
            annual_projected_savings: round2(total_monthly_savings * 12.0),
            coverage_pct,
        }
    }
}

impl Default for CoverageReport {
    fn default() -> Self {
        Self::new()
    }
}
