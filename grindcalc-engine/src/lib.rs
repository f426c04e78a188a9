//! Grindcalc Engine
//!
//! Models repeatable resource-production cycles ("grinds") in a game economy
//! and solves them: which mix of steps keeps every intermediate resource
//! balanced, and which such mix earns the most echoes per action spent.
//! This crate has no I/O; the `grindcalc` binary wraps it.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod grind;
pub mod linalg;
pub mod numbers;
pub mod probability;
pub mod report;
pub mod request;
pub mod resource;
pub mod rules;
pub mod stats;
pub mod step;

// Re-export commonly used types
pub use catalog::{
    BalmoralTables, BuildContext, Catalog, StepBuilder, StepParam, StepSource, WoodsStrategy,
    balmoral_tables, ranching_cycle,
};
pub use error::{GrindError, OptimizerError};
pub use grind::{
    CycleMetrics, Grind, GrindOptions, Outcome, Overflow, OverflowCredit, RatioReport, Validity,
};
pub use linalg::Matrix;
pub use probability::{CheckMode, binomial_distribution, binomial_pmf, broad, narrow};
pub use report::{GrindReport, StepReport};
pub use request::CycleRequest;
pub use resource::{Resource, ResourceVector};
pub use rules::{GameRules, SolverConfig};
pub use stats::{Stat, Stats};
pub use step::{SaleOutcome, Step};
