//! Steps: one discrete action and the expected resource change it causes.
//!
//! Check outcomes are folded in as expectations when a step is built, so a
//! step's vector is deterministic for a given set of stats and rules.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::OVERFLOW_SUFFIX;
use crate::error::GrindError;
use crate::probability::{CheckMode, broad};
use crate::resource::{Resource, ResourceVector};
use crate::rules::GameRules;

/// One implausibility tier of a sale and the chance of landing in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub implausibility: f64,
    pub probability: f64,
}

impl SaleOutcome {
    #[must_use]
    pub const fn new(implausibility: f64, probability: f64) -> Self {
        Self {
            implausibility,
            probability,
        }
    }

    /// Pair implausibility tiers with their probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::LengthMismatch`] when the slices differ in length.
    pub fn zip(implausibilities: &[f64], probabilities: &[f64]) -> Result<Vec<Self>, GrindError> {
        if implausibilities.len() != probabilities.len() {
            return Err(GrindError::LengthMismatch {
                what: "sale outcome",
                left: implausibilities.len(),
                right: probabilities.len(),
            });
        }
        Ok(implausibilities
            .iter()
            .zip(probabilities)
            .map(|(&implausibility, &probability)| Self::new(implausibility, probability))
            .collect())
    }
}

/// A step of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub resources: ResourceVector,
    /// Produced resources that other steps need not fully consume.
    #[serde(default)]
    pub overflow_eligible: SmallVec<[Resource; 4]>,
}

impl Step {
    /// A step with the given fixed deltas and zero everywhere else.
    #[must_use]
    pub fn new(name: impl Into<String>, deltas: &[(Resource, f64)]) -> Self {
        Self {
            name: name.into(),
            resources: ResourceVector::from_entries(deltas),
            overflow_eligible: SmallVec::new(),
        }
    }

    /// Like [`Step::new`] but with deltas keyed by resource name.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::UnknownResource`] for a name outside the vocabulary.
    pub fn from_named(name: impl Into<String>, deltas: &[(&str, f64)]) -> Result<Self, GrindError> {
        let resolved = deltas
            .iter()
            .map(|&(key, amount)| key.parse::<Resource>().map(|resource| (resource, amount)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, &resolved))
    }

    /// Synthetic step that discards one unit of `resource`.
    ///
    /// With a `credit`, each discarded unit is sold for `price` of the
    /// substitute resource.
    #[must_use]
    pub fn overflow(resource: Resource, credit: Option<(Resource, f64)>) -> Self {
        let mut step = Self::new(format!("{resource}{OVERFLOW_SUFFIX}"), &[(resource, -1.0)]);
        if let Some((substitute, price)) = credit {
            step.add_resource(substitute, price);
        }
        step
    }

    #[must_use]
    pub fn with_overflow_eligible(mut self, resources: &[Resource]) -> Self {
        self.overflow_eligible.extend_from_slice(resources);
        self
    }

    #[must_use]
    pub fn get_resource(&self, resource: Resource) -> f64 {
        self.resources[resource]
    }

    pub fn add_resource(&mut self, resource: Resource, amount: f64) {
        self.resources[resource] += amount;
    }

    pub fn remove_resource(&mut self, resource: Resource, amount: f64) {
        self.resources[resource] -= amount;
    }

    /// Expected extra actions from retrying a failed check until it passes.
    ///
    /// Adds `1/p - 1` to Actions and returns it.
    pub fn action_penalty(&mut self, difficulty: f64, stat: f64, mode: CheckMode) -> f64 {
        let p = mode.probability(difficulty, stat);
        let penalty = 1.0 / p - 1.0;
        self.resources[Resource::Actions] += penalty;
        penalty
    }

    /// Retry cost plus the actions needed to heal the menace each failure adds.
    ///
    /// Returns the healing cost only; the retry cost is already on Actions.
    pub fn menace_penalty(
        &mut self,
        rules: &GameRules,
        difficulty: f64,
        stat: f64,
        menace_per_failure: f64,
        mode: CheckMode,
    ) -> f64 {
        let failures = self.action_penalty(difficulty, stat, mode);
        let heal = failures * menace_per_failure / rules.menace_heal_rate();
        self.resources[Resource::Actions] += heal;
        heal
    }

    /// Expected cost of failed sales and the menace they raise.
    ///
    /// Each outcome's sale is a broad check at `multiplier * implausibility`;
    /// contributions are weighted by the outcome's probability and summed.
    pub fn sell_penalty(
        &mut self,
        rules: &GameRules,
        multiplier: f64,
        stat: f64,
        menace_per_failure: f64,
        outcomes: &[SaleOutcome],
    ) -> f64 {
        let heal_factor = 1.0 + menace_per_failure / rules.menace_heal_rate();
        let penalty: f64 = outcomes
            .iter()
            .map(|outcome| {
                let p = broad(multiplier * outcome.implausibility, stat);
                outcome.probability * (1.0 / p - 1.0) * heal_factor
            })
            .sum();
        self.resources[Resource::Actions] += penalty;
        penalty
    }
}
