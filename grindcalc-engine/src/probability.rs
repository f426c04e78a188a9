//! Success chance of skill checks.
//!
//! Difficulty follows the in-game convention: it is the score at which a
//! check succeeds 60% of the time. Scalar functions live alongside explicit
//! element-wise variants for steps that evaluate a whole distribution of
//! difficulties against one score.
use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete};
use std::fmt;
use std::str::FromStr;

use crate::constants::{CHECK_BASE_CHANCE, NARROW_FLOOR, NARROW_STEP};
use crate::error::GrindError;

/// Shape of a check's sensitivity to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Proportional to score, saturating at certainty.
    #[default]
    Broad,
    /// Steep band around the difficulty, never below 10%.
    Narrow,
}

impl CheckMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Broad => "broad",
            Self::Narrow => "narrow",
        }
    }

    /// Success probability of one check.
    #[must_use]
    pub fn probability(self, difficulty: f64, score: f64) -> f64 {
        match self {
            Self::Broad => broad(difficulty, score),
            Self::Narrow => narrow(difficulty, score),
        }
    }

    /// Success probability for each difficulty against the same score.
    #[must_use]
    pub fn probabilities(self, difficulties: &[f64], score: f64) -> Vec<f64> {
        difficulties
            .iter()
            .map(|&difficulty| self.probability(difficulty, score))
            .collect()
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckMode {
    type Err = GrindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broad" => Ok(Self::Broad),
            "narrow" => Ok(Self::Narrow),
            other => Err(GrindError::Parse {
                what: "check mode",
                reason: format!("`{other}` is neither broad nor narrow"),
            }),
        }
    }
}

/// Broad check: `min(1, 0.6 * score / difficulty)`, certain at difficulty 0.
#[must_use]
pub fn broad(difficulty: f64, score: f64) -> f64 {
    if difficulty == 0.0 {
        return 1.0;
    }
    (CHECK_BASE_CHANCE * score / difficulty).min(1.0)
}

/// Narrow check: 60% at the difficulty, +-10% per point, clamped to `[0.1, 1]`.
#[must_use]
pub fn narrow(difficulty: f64, score: f64) -> f64 {
    (NARROW_STEP * (score - difficulty) + CHECK_BASE_CHANCE).clamp(NARROW_FLOOR, 1.0)
}

/// Element-wise [`broad`] over a set of difficulties.
#[must_use]
pub fn broad_over(difficulties: &[f64], score: f64) -> Vec<f64> {
    CheckMode::Broad.probabilities(difficulties, score)
}

/// Element-wise [`narrow`] over a set of difficulties.
#[must_use]
pub fn narrow_over(difficulties: &[f64], score: f64) -> Vec<f64> {
    CheckMode::Narrow.probabilities(difficulties, score)
}

/// Probability of exactly `k` successes in `n` independent trials.
///
/// `p` is clamped to `[0, 1]`; a NaN chance yields NaN.
#[must_use]
pub fn binomial_pmf(k: u32, n: u32, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    match Binomial::new(p.clamp(0.0, 1.0), u64::from(n)) {
        Ok(dist) => dist.pmf(u64::from(k)),
        Err(_) => f64::NAN,
    }
}

/// Probabilities of 0..=n successes in `n` trials.
#[must_use]
pub fn binomial_distribution(n: u32, p: f64) -> Vec<f64> {
    (0..=n).map(|k| binomial_pmf(k, n, p)).collect()
}
