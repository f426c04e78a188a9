//! Error types shared across the engine.
use thiserror::Error;

use crate::stats::Stat;

/// Fatal construction and lookup errors.
///
/// These abort the solve that raised them. Solvability outcomes such as
/// "no cycle" or "not practicable" are never reported through this type; see
/// [`crate::grind::Outcome`] and [`crate::grind::Validity`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GrindError {
    #[error("unknown resource `{0}`")]
    UnknownResource(String),
    #[error("unknown step `{0}`")]
    UnknownStep(String),
    #[error("missing stat `{0}`")]
    MissingStat(Stat),
    #[error("unknown stat `{0}`")]
    UnknownStat(String),
    #[error("invalid parameter for `{step}`: {reason}")]
    InvalidParameter { step: String, reason: String },
    #[error("{what} length mismatch: {left} vs {right}")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
    #[error("objective resource `{0}` cannot be blacklisted")]
    ObjectiveBlacklisted(String),
    #[error("resource `{0}` is both blacklisted and overflowed")]
    BlacklistedOverflow(String),
    #[error("no step in the cycle lets `{0}` overflow")]
    OverflowNotEligible(String),
    #[error("reference step `{0}` has a zero solution entry")]
    ZeroReference(String),
    #[error("no solution vector available")]
    NoSolution,
    #[error("{field} must be {expectation} (got {value})")]
    InvalidConfig {
        field: &'static str,
        expectation: &'static str,
        value: f64,
    },
    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },
}

/// Reasons the multi-dimensional optimizer can fail to produce a cycle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("no non-negative combination of steps has positive gain")]
    NoPositiveGain,
    #[error("actions per gain is unbounded below")]
    Unbounded,
    #[error("optimizer did not converge within {iterations} pivots")]
    IterationLimit { iterations: usize },
    #[error("optimizer result {found:.6} is worse than the seed {seed:.6}")]
    WorseThanSeed { found: f64, seed: f64 },
}
