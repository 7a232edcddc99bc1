//! Windowed cost anomaly detection
//!
//! Two detectors over an ordered daily cost series: deviation from the
//! trailing 7-day average, and day-over-day spikes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AnomalySeverity;
use crate::models::DailyCost;
use crate::numeric::{round1, round2};

/// Trailing window length in days
const ROLLING_WINDOW_DAYS: usize = 7;

/// Deviation percentage above which a finding escalates to HIGH
const HIGH_DEVIATION_PCT: f64 = 100.0;

/// Day exceeding the trailing 7-day average by the threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingDeviation {
    pub date: NaiveDate,
    pub resource: String,
    pub cost: f64,
    pub seven_day_avg: f64,
    pub deviation_pct: f64,
    pub threshold_pct: f64,
    pub severity: AnomalySeverity,
}

/// Detects days where cost exceeds the trailing 7-day average
pub struct RollingAverageDetector {
    /// Percentage above the rolling average that counts as anomalous
    pub threshold_pct: f64,
}

impl RollingAverageDetector {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    /// Scan an ordered daily cost series
    ///
    /// Needs at least eight data points: seven for the first window plus
    /// the day under test.
    pub fn detect(&self, daily_costs: &[DailyCost]) -> Vec<RollingDeviation> {
        let mut findings = Vec::new();
        if daily_costs.len() <= ROLLING_WINDOW_DAYS {
            return findings;
        }

        for i in ROLLING_WINDOW_DAYS..daily_costs.len() {
            let window = &daily_costs[i - ROLLING_WINDOW_DAYS..i];
            let avg = window.iter().map(|d| d.cost).sum::<f64>() / ROLLING_WINDOW_DAYS as f64;
            let current = &daily_costs[i];

            if avg > 0.0 && current.cost > avg * (1.0 + self.threshold_pct / 100.0) {
                let deviation = (current.cost - avg) / avg * 100.0;
                findings.push(RollingDeviation {
                    date: current.date,
                    resource: current.resource_label().to_string(),
                    cost: round2(current.cost),
                    seven_day_avg: round2(avg),
                    deviation_pct: round1(deviation),
                    threshold_pct: self.threshold_pct,
                    severity: if deviation > HIGH_DEVIATION_PCT {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Warning
                    },
                });
            }
        }

        findings
    }
}

impl Default for RollingAverageDetector {
    fn default() -> Self {
        Self::new(30.0)
    }
}

/// Day-over-day spike beyond the threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOverDaySpike {
    pub date: NaiveDate,
    pub resource: String,
    pub cost: f64,
    pub previous_day: f64,
    pub spike_pct: f64,
    pub severity: AnomalySeverity,
}

/// Detects day-over-day cost spikes
pub struct DayOverDayDetector {
    /// Percentage increase over the previous day that counts as a spike
    pub threshold_pct: f64,
}

impl DayOverDayDetector {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    pub fn detect(&self, daily_costs: &[DailyCost]) -> Vec<DayOverDaySpike> {
        let mut findings = Vec::new();

        for pair in daily_costs.windows(2) {
            let prev = pair[0].cost;
            let curr = &pair[1];

            if prev > 0.0 && curr.cost > prev * (1.0 + self.threshold_pct / 100.0) {
                let spike = (curr.cost - prev) / prev * 100.0;
                findings.push(DayOverDaySpike {
                    date: curr.date,
                    resource: curr.resource_label().to_string(),
                    cost: round2(curr.cost),
                    previous_day: round2(prev),
                    spike_pct: round1(spike),
                    severity: if spike > HIGH_DEVIATION_PCT {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Warning
                    },
                });
            }
        }

        findings
    }
}

impl Default for DayOverDayDetector {
    fn default() -> Self {
        Self::new(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(costs: &[f64]) -> Vec<DailyCost> {
        costs
            .iter()
            .enumerate()
            .map(|(i, cost)| DailyCost {
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(i as u64),
                cost: *cost,
                resource: None,
                created_date: None,
            })
            .collect()
    }

    #[test]
    fn test_flat_series_is_quiet() {
        let detector = RollingAverageDetector::default();
        assert!(detector.detect(&series(&[10.0; 14])).is_empty());
    }

    #[test]
    fn test_rolling_deviation_detected() {
        let mut costs = vec![10.0; 7];
        costs.push(20.0); // 100% above the 7-day average of 10

        let findings = RollingAverageDetector::new(30.0).detect(&series(&costs));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].seven_day_avg, 10.0);
        assert_eq!(findings[0].deviation_pct, 100.0);
        assert_eq!(findings[0].severity, AnomalySeverity::Warning);
        assert_eq!(findings[0].resource, "Subscription");
    }

    #[test]
    fn test_rolling_high_severity_above_double() {
        let mut costs = vec![10.0; 7];
        costs.push(25.0);

        let findings = RollingAverageDetector::new(30.0).detect(&series(&costs));
        assert_eq!(findings[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn test_short_series_needs_full_window() {
        let detector = RollingAverageDetector::default();
        assert!(detector.detect(&series(&[10.0, 100.0, 10.0, 100.0])).is_empty());
    }

    #[test]
    fn test_day_over_day_spike() {
        let findings = DayOverDayDetector::new(50.0).detect(&series(&[10.0, 16.0]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].previous_day, 10.0);
        assert_eq!(findings[0].spike_pct, 60.0);
        assert_eq!(findings[0].severity, AnomalySeverity::Warning);
    }

    #[test]
    fn test_day_over_day_high_severity() {
        let findings = DayOverDayDetector::new(50.0).detect(&series(&[10.0, 30.0]));
        assert_eq!(findings[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn test_zero_previous_day_ignored() {
        let findings = DayOverDayDetector::default().detect(&series(&[0.0, 100.0]));
        assert!(findings.is_empty());
    }
}
