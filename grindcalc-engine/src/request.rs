//! Cycle requests: everything one solve needs, as a single serde value.
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, StepSource, ranching_cycle};
use crate::error::GrindError;
use crate::grind::{Grind, GrindOptions};
use crate::rules::{GameRules, SolverConfig};
use crate::stats::Stats;

/// A cycle to solve, usually read from a JSON file.
///
/// ```json
/// {
///   "stats": {"Persuasive": 269, "Shadowy": 265, "Mith": 7},
///   "steps": ["Get Mammoth", "Holy Mammoth"],
///   "overflow": ["WTentacles"],
///   "params": {"Get 7Necks": ["patient"]},
///   "rules": {"social_heals": true}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleRequest {
    pub stats: Stats,
    /// Step names in column order. Empty means the ranching cycle.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(flatten)]
    pub options: GrindOptions,
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl CycleRequest {
    /// Parse a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::Parse`] when the text is not a valid request.
    pub fn from_json(text: &str) -> Result<Self, GrindError> {
        serde_json::from_str(text).map_err(|err| GrindError::Parse {
            what: "cycle request",
            reason: err.to_string(),
        })
    }

    /// Requested steps, falling back to the ranching cycle.
    #[must_use]
    pub fn step_names(&self) -> Vec<String> {
        if self.steps.is_empty() {
            ranching_cycle(&[])
        } else {
            self.steps.clone()
        }
    }

    /// Solve against any step source.
    ///
    /// # Errors
    ///
    /// Propagates every [`GrindError`] raised while building or solving.
    pub fn solve_with<S: StepSource + ?Sized>(&self, source: &S) -> Result<Grind, GrindError> {
        Grind::new(
            source,
            &self.stats,
            &self.step_names(),
            &self.options,
            &self.rules,
            &self.solver,
        )
    }

    /// Solve against [`Catalog::standard`].
    ///
    /// # Errors
    ///
    /// Propagates every [`GrindError`] raised while building or solving.
    pub fn solve(&self) -> Result<Grind, GrindError> {
        self.solve_with(&Catalog::standard())
    }
}
