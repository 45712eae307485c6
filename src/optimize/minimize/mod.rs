//! Multivariate unconstrained minimization with L-BFGS.

mod history;
mod lbfgs;
mod line_search;
mod types;

pub use lbfgs::minimize;
pub use types::{LbfgsOptions, LineSearchMethod, OptimizationResult, OptimizationStatus};
