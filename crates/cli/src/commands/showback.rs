//! Showback report command

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

use finops_lib::allocation::AllocationReport;
use finops_lib::models::BudgetBook;
use finops_lib::showback::render_showback;

use crate::loader;
use crate::output;

/// Render the Markdown showback report from a saved allocation
pub fn run(allocation: &Path, budgets: Option<PathBuf>, output_path: Option<PathBuf>) -> Result<()> {
    let report: AllocationReport = loader::load_json(allocation)?;
    let budgets = match budgets {
        Some(path) => loader::load_json::<BudgetBook>(&path)?.budgets,
        None => Default::default(),
    };

    let markdown = render_showback(&report, &budgets, Utc::now());

    match output_path {
        Some(path) => {
            loader::write_text(&path, &markdown)?;
            output::print_success(&format!("Showback report written to {}", path.display()));
        }
        None => println!("{}", markdown),
    }

    Ok(())
}
