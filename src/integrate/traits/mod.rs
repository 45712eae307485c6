//! Trait definitions and types for integration algorithms.

mod oracle;
mod types;

pub use oracle::{CubatureOracle, OracleReport, OracleStatus};
pub use types::{CubatureOptions, IntegrationResult, IntegrationStatus, Interval, QuadOptions};
