//! Analytics library for cloud cost governance
//!
//! This crate provides the core functionality for:
//! - Cost allocation across cost centers (direct, shared, quarantine)
//! - Tag compliance scoring and hygiene scanning
//! - Cost anomaly detection
//! - Reservation fitness, break-even, and coverage analysis
//! - Waste scanning and rightsizing
//! - Showback report rendering

pub mod allocation;
pub mod anomaly;
pub mod compliance;
pub mod config;
pub mod models;
mod numeric;
pub mod reservation;
pub mod showback;
pub mod waste;

pub use allocation::{AllocationError, AllocationReport, CostAllocator};
pub use config::AnalysisConfig;
pub use models::*;
