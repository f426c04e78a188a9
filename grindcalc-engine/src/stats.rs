//! Player stats consumed by step builders.
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GrindError;

/// Stats referenced by the standard catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Persuasive,
    Watchful,
    Shadowy,
    Dangerous,
    Mithridacy,
    ShapelingArts,
    ArtisanOfTheRedScience,
    PlayerOfChess,
    MonstrousAnatomy,
}

impl Stat {
    pub const ALL: [Self; 9] = [
        Self::Persuasive,
        Self::Watchful,
        Self::Shadowy,
        Self::Dangerous,
        Self::Mithridacy,
        Self::ShapelingArts,
        Self::ArtisanOfTheRedScience,
        Self::PlayerOfChess,
        Self::MonstrousAnatomy,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persuasive => "Persuasive",
            Self::Watchful => "Watchful",
            Self::Shadowy => "Shadowy",
            Self::Dangerous => "Dangerous",
            Self::Mithridacy => "Mith",
            Self::ShapelingArts => "SArts",
            Self::ArtisanOfTheRedScience => "AotRS",
            Self::PlayerOfChess => "aPoC",
            Self::MonstrousAnatomy => "MAnatomy",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = GrindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| GrindError::UnknownStat(s.to_string()))
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Stat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Stat scores for one solve. Missing stats fail the builder that needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Stats(BTreeMap<Stat, f64>);

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, stat: Stat, score: f64) -> Self {
        self.set(stat, score);
        self
    }

    pub fn set(&mut self, stat: Stat, score: f64) {
        self.0.insert(stat, score);
    }

    /// Score for `stat`.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::MissingStat`] when the stat was never set.
    pub fn require(&self, stat: Stat) -> Result<f64, GrindError> {
        self.0
            .get(&stat)
            .copied()
            .ok_or(GrindError::MissingStat(stat))
    }

    #[must_use]
    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.0.get(&stat).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.0.iter().map(|(stat, score)| (*stat, *score))
    }
}

impl FromIterator<(Stat, f64)> for Stats {
    fn from_iter<T: IntoIterator<Item = (Stat, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
