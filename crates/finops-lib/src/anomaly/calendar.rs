//! Calendar-aware anomaly detection
//!
//! Weekend spend compared against the weekday baseline, and freshly
//! created resources that start out expensive.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::AnomalySeverity;
use crate::models::DailyCost;
use crate::numeric::{round1, round2};

/// Weekend day whose cost exceeds the weekday average by the multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendAnomaly {
    pub date: NaiveDate,
    pub resource: String,
    pub weekend_cost: f64,
    pub weekday_avg: f64,
    pub multiplier: f64,
    pub severity: AnomalySeverity,
}

/// Detects significant weekend cost against the weekday baseline
pub struct WeekendDetector {
    /// Weekend cost must exceed this multiple of the weekday average
    pub weekday_avg_multiplier: f64,
}

impl WeekendDetector {
    pub fn new(weekday_avg_multiplier: f64) -> Self {
        Self {
            weekday_avg_multiplier,
        }
    }

    pub fn detect(&self, daily_costs: &[DailyCost]) -> Vec<WeekendAnomaly> {
        let (weekdays, weekends): (Vec<_>, Vec<_>) = daily_costs
            .iter()
            .partition(|d| d.date.weekday().num_days_from_monday() < 5);

        if weekdays.is_empty() || weekends.is_empty() {
            return Vec::new();
        }

        let weekday_avg =
            weekdays.iter().map(|d| d.cost).sum::<f64>() / weekdays.len() as f64;
        if weekday_avg <= 0.0 {
            return Vec::new();
        }

        weekends
            .iter()
            .filter(|d| d.cost > weekday_avg * self.weekday_avg_multiplier)
            .map(|d| WeekendAnomaly {
                date: d.date,
                resource: d.resource_label().to_string(),
                weekend_cost: round2(d.cost),
                weekday_avg: round2(weekday_avg),
                multiplier: round1(d.cost / weekday_avg),
                severity: AnomalySeverity::Warning,
            })
            .collect()
    }
}

impl Default for WeekendDetector {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// Recently created resource already exceeding the daily cost floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResourceCost {
    pub date: NaiveDate,
    pub resource: String,
    pub daily_cost: f64,
    pub created_date: NaiveDate,
    pub threshold: f64,
    pub severity: AnomalySeverity,
}

/// Flags new resources whose daily cost starts high
pub struct NewResourceDetector {
    /// Daily cost above which a new resource is flagged
    pub threshold_daily: f64,
    /// How far back a creation date counts as "new"
    pub lookback_days: u64,
}

impl NewResourceDetector {
    pub fn new(threshold_daily: f64, lookback_days: u64) -> Self {
        Self {
            threshold_daily,
            lookback_days,
        }
    }

    pub fn detect(&self, daily_costs: &[DailyCost], today: NaiveDate) -> Vec<NewResourceCost> {
        let cutoff = today
            .checked_sub_days(Days::new(self.lookback_days))
            .unwrap_or(today);

        daily_costs
            .iter()
            .filter_map(|d| {
                let created = d.created_date?;
                if created >= cutoff && d.cost > self.threshold_daily {
                    Some(NewResourceCost {
                        date: d.date,
                        resource: d.resource_label().to_string(),
                        daily_cost: round2(d.cost),
                        created_date: created,
                        threshold: self.threshold_daily,
                        severity: AnomalySeverity::Warning,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for NewResourceDetector {
    fn default() -> Self {
        Self::new(25.0, 7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, cost: f64) -> DailyCost {
        DailyCost {
            date: date.parse().unwrap(),
            cost,
            resource: Some("vm-batch".to_string()),
            created_date: None,
        }
    }

    #[test]
    fn test_weekend_anomaly_detected() {
        // 2026-03-02 is a Monday, 2026-03-07 a Saturday
        let series = vec![
            day("2026-03-02", 10.0),
            day("2026-03-03", 10.0),
            day("2026-03-04", 10.0),
            day("2026-03-05", 10.0),
            day("2026-03-06", 10.0),
            day("2026-03-07", 25.0),
            day("2026-03-08", 5.0),
        ];

        let findings = WeekendDetector::default().detect(&series);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].weekday_avg, 10.0);
        assert_eq!(findings[0].multiplier, 2.5);
    }

    #[test]
    fn test_quiet_weekend_passes() {
        let series = vec![
            day("2026-03-02", 10.0),
            day("2026-03-03", 10.0),
            day("2026-03-07", 15.0),
        ];
        assert!(WeekendDetector::default().detect(&series).is_empty());
    }

    #[test]
    fn test_new_resource_inside_lookback() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        let mut d = day("2026-03-09", 40.0);
        d.created_date = Some("2026-03-08".parse().unwrap());

        let findings = NewResourceDetector::default().detect(&[d], today);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].daily_cost, 40.0);
    }

    #[test]
    fn test_old_resource_not_flagged() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        let mut d = day("2026-03-09", 40.0);
        d.created_date = Some("2026-01-01".parse().unwrap());

        assert!(NewResourceDetector::default().detect(&[d], today).is_empty());
    }

    #[test]
    fn test_cheap_new_resource_not_flagged() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        let mut d = day("2026-03-09", 5.0);
        d.created_date = Some("2026-03-08".parse().unwrap());

        assert!(NewResourceDetector::default().detect(&[d], today).is_empty());
    }
}
