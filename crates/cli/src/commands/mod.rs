//! CLI command implementations

pub mod allocate;
pub mod anomaly;
pub mod compliance;
pub mod reservation;
pub mod showback;
pub mod waste;
