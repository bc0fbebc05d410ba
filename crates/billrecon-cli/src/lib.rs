//! CLI library components for billing reconciliation.

pub mod intake;
pub mod logging;
