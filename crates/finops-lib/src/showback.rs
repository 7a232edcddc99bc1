//! Markdown showback report rendering
//!
//! Pure string builder over an allocation report: per-cost-center summary
//! with budget variance, shared distribution detail, and an environment
//! breakdown. File writing stays with the caller.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::allocation::AllocationReport;
use crate::models::Budget;

/// Render the Markdown showback report
pub fn render_showback(
    allocation: &AllocationReport,
    budgets: &BTreeMap<String, Budget>,
    generated_at: DateTime<Utc>,
) -> String {
    let fully_loaded = &allocation.fully_loaded;
    let grand_total = fully_loaded.grand_total;
    let quarantine = fully_loaded.untagged_quarantine;
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Monthly Showback Report".to_string());
    lines.push(String::new());
    lines.push(format!("> **Period:** {}", allocation.allocation_date));
    lines.push(format!(
        "> **Generated:** {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(format!("> **Total spend:** ${}", money(grand_total)));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("## Cost Center Summary".to_string());
    lines.push(String::new());
    lines.push(
        "| Cost Center | Direct | Shared | Total | % of Spend | Budget | Variance |".to_string(),
    );
    lines.push(
        "|-------------|--------|--------|-------|-----------|--------|----------|".to_string(),
    );

    for (cc, cost) in &fully_loaded.cost_centers {
        let pct = if grand_total > 0.0 {
            cost.total / grand_total * 100.0
        } else {
            0.0
        };
        let budget = budgets.get(cc).map(|b| b.monthly).unwrap_or(0.0);
        let (budget_str, variance_str) = if budget > 0.0 {
            (
                format!("${}", money(budget)),
                format!("${}", money(budget - cost.total)),
            )
        } else {
            ("N/A".to_string(), "N/A".to_string())
        };
        lines.push(format!(
            "| {} | ${} | ${} | ${} | {:.1}% | {} | {} |",
            cc,
            money(cost.direct),
            money(cost.shared),
            money(cost.total),
            pct,
            budget_str,
            variance_str
        ));
    }

    if quarantine > 0.0 {
        let q_pct = if grand_total > 0.0 {
            quarantine / grand_total * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "| **Untagged (quarantine)** | ${} | - | ${} | {:.1}% | - | - |",
            money(quarantine),
            money(quarantine),
            q_pct
        ));
    }

    lines.push(format!(
        "| **TOTAL** | | | **${}** | 100% | | |",
        money(grand_total)
    ));
    lines.push(String::new());

    if !allocation.shared_distributions.is_empty() {
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push("## Shared Cost Distribution Detail".to_string());
        lines.push(String::new());
        lines.push("| Shared Resource | Total | Method | Distribution |".to_string());
        lines.push("|----------------|-------|--------|-------------|".to_string());

        for (name, outcome) in &allocation.shared_distributions {
            if let Some(alloc) = outcome.allocation() {
                let distribution = alloc
                    .allocation
                    .iter()
                    .map(|(cc, amount)| format!("{}: ${}", cc, money(*amount)))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!(
                    "| {} | ${} | {} | {} |",
                    name,
                    money(alloc.total_cost),
                    alloc.method,
                    distribution
                ));
            }
        }
    }

    lines.push(String::new());

    let by_env = &allocation.direct.by_environment;
    if !by_env.is_empty() {
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push("## Environment Breakdown".to_string());
        lines.push(String::new());
        lines.push("| Environment | Monthly Cost | % of Direct |".to_string());
        lines.push("|-------------|-------------|-------------|".to_string());

        let direct_total: f64 = by_env.values().sum();
        let mut envs: Vec<(&String, &f64)> = by_env.iter().collect();
        envs.sort_by(|a, b| {
            b.1.partial_cmp(a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        for (env, cost) in envs {
            let pct = if direct_total > 0.0 {
                cost / direct_total * 100.0
            } else {
                0.0
            };
            lines.push(format!("| {} | ${} | {:.1}% |", env, money(*cost), pct));
        }
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
    lines.push("*The team that provisions the resource owns the bill.*".to_string());

    lines.join("\n")
}

/// Format an amount with two decimals and thousands separators
fn money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::CostAllocator;
    use crate::models::{AllocationMethod, AllocationRule, ResourceRecord, SharedResource};
    use chrono::TimeZone;

    fn report() -> AllocationReport {
        let resources: Vec<ResourceRecord> = serde_json::from_value(serde_json::json!([
            {"name": "api-vm", "monthly_cost": 1200.0,
             "tags": {"CostCenter": "Eng", "Environment": "production"}},
            {"name": "build-vm", "monthly_cost": 300.0,
             "tags": {"CostCenter": "Eng", "Environment": "development"}},
            {"name": "stray-disk", "monthly_cost": 25.0},
        ]))
        .unwrap();
        let shared = vec![SharedResource {
            name: "gateway".to_string(),
            monthly_cost: 500.0,
            allocation_rule: "split-equal".to_string(),
            allocation_weights: Default::default(),
        }];
        let rules = vec![AllocationRule {
            name: "split-equal".to_string(),
            method: AllocationMethod::Equal,
            fixed_splits: Default::default(),
        }];

        CostAllocator::new()
            .run(&resources, &shared, &rules, "2026-02-01".parse().unwrap())
            .unwrap()
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_summary_table_rows() {
        let md = render_showback(&report(), &BTreeMap::new(), generated());
        assert!(md.contains("# Monthly Showback Report"));
        assert!(md.contains("> **Period:** 2026-02-01"));
        assert!(md.contains("| Eng | $1,500.00 | $500.00 | $2,000.00 |"));
        assert!(md.contains("**Untagged (quarantine)** | $25.00"));
        assert!(md.contains("**$2,025.00**"));
    }

    #[test]
    fn test_budget_variance_column() {
        let mut budgets = BTreeMap::new();
        budgets.insert("Eng".to_string(), Budget { monthly: 2500.0 });

        let md = render_showback(&report(), &budgets, generated());
        assert!(md.contains("$2,500.00 | $500.00 |"));
    }

    #[test]
    fn test_shared_detail_and_environment_sections() {
        let md = render_showback(&report(), &BTreeMap::new(), generated());
        assert!(md.contains("## Shared Cost Distribution Detail"));
        assert!(md.contains("| gateway | $500.00 | equal | Eng: $500.00 |"));
        assert!(md.contains("## Environment Breakdown"));
        // production sorts first by descending cost
        let prod = md.find("| production |").unwrap();
        let dev = md.find("| development |").unwrap();
        assert!(prod < dev);
    }

    #[test]
    fn test_money_grouping() {
        assert_eq!(money(1234567.891), "1,234,567.89");
        assert_eq!(money(0.5), "0.50");
        assert_eq!(money(-1200.0), "-1,200.00");
    }
}
