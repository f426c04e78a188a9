//! Game-rule toggles and solver configuration.
//!
//! Both are plain values threaded explicitly through builders and the solver,
//! so one experiment's settings never leak into another's.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SCRIP_EXCHANGE_RATE, DEFAULT_ZERO_TOLERANCE,
    MENACE_HEAL_PER_ACTION,
};
use crate::error::GrindError;

/// Toggles that change how step builders model the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Heal menaces at the social rate (6 per action) instead of 3.
    #[serde(default)]
    pub social_heals: bool,
    /// The event-locked carving knife is available to remove Antiquity.
    #[serde(default = "GameRules::default_scrimshander_knife")]
    pub scrimshander_knife: bool,
    /// Fill unused limb slots on Mammoths from Hell with Holy Relics.
    #[serde(default = "GameRules::default_use_hrelic_on_hell_mammoth")]
    pub use_hrelic_on_hell_mammoth: bool,
    /// The palaeontologist companion boosts bone newspapers.
    #[serde(default)]
    pub debonair_palaeontologist: bool,
}

impl GameRules {
    const fn default_scrimshander_knife() -> bool {
        true
    }

    const fn default_use_hrelic_on_hell_mammoth() -> bool {
        true
    }

    /// Menace healed per action under these rules.
    #[must_use]
    pub fn menace_heal_rate(&self) -> f64 {
        MENACE_HEAL_PER_ACTION * (1.0 + f64::from(u8::from(self.social_heals)))
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            social_heals: false,
            scrimshander_knife: Self::default_scrimshander_knife(),
            use_hrelic_on_hell_mammoth: Self::default_use_hrelic_on_hell_mammoth(),
            debonair_palaeontologist: false,
        }
    }
}

/// Numerical settings for [`crate::grind::Grind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Echoes per Scrip when folding Scrip into gain.
    #[serde(default = "SolverConfig::default_scrip_exchange_rate")]
    pub scrip_exchange_rate: f64,
    /// Relative threshold under which a singular value counts as zero.
    #[serde(default = "SolverConfig::default_zero_tolerance")]
    pub zero_tolerance: f64,
    /// Pivot budget for the multi-dimensional optimizer.
    #[serde(default = "SolverConfig::default_max_iterations")]
    pub max_iterations: usize,
}

impl SolverConfig {
    const fn default_scrip_exchange_rate() -> f64 {
        DEFAULT_SCRIP_EXCHANGE_RATE
    }

    const fn default_zero_tolerance() -> f64 {
        DEFAULT_ZERO_TOLERANCE
    }

    const fn default_max_iterations() -> usize {
        DEFAULT_MAX_ITERATIONS
    }

    #[must_use]
    pub const fn with_exchange_rate(mut self, rate: f64) -> Self {
        self.scrip_exchange_rate = rate;
        self
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::InvalidConfig`] for a negative or non-finite
    /// exchange rate, a non-positive tolerance or a zero pivot budget.
    pub fn validate(&self) -> Result<(), GrindError> {
        if !self.scrip_exchange_rate.is_finite() || self.scrip_exchange_rate < 0.0 {
            return Err(GrindError::InvalidConfig {
                field: "scrip_exchange_rate",
                expectation: "finite and non-negative",
                value: self.scrip_exchange_rate,
            });
        }
        if !self.zero_tolerance.is_finite() || self.zero_tolerance <= 0.0 {
            return Err(GrindError::InvalidConfig {
                field: "zero_tolerance",
                expectation: "finite and positive",
                value: self.zero_tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(GrindError::InvalidConfig {
                field: "max_iterations",
                expectation: "at least 1",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scrip_exchange_rate: Self::default_scrip_exchange_rate(),
            zero_tolerance: Self::default_zero_tolerance(),
            max_iterations: Self::default_max_iterations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_rate_doubles_with_social_heals() {
        let solo = GameRules::default();
        let social = GameRules {
            social_heals: true,
            ..GameRules::default()
        };
        assert!((solo.menace_heal_rate() - 3.0).abs() < f64::EPSILON);
        assert!((social.menace_heal_rate() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let rules: GameRules = serde_json::from_str(r#"{"social_heals": true}"#).unwrap();
        assert!(rules.social_heals);
        assert!(rules.scrimshander_knife);
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(SolverConfig::default().validate().is_ok());
        let negative = SolverConfig::default().with_exchange_rate(-1.0);
        assert!(matches!(
            negative.validate(),
            Err(GrindError::InvalidConfig {
                field: "scrip_exchange_rate",
                ..
            })
        ));
        let zero_budget = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(zero_budget.validate().is_err());
    }
}
