//! Step catalog: the name-to-builder registry the solver draws steps from.
//!
//! A builder is a pure function of stats, rules and optional positional
//! parameters. It returns `Ok(None)` when the step does not apply under the
//! current rules; the solver then drops the step from the cycle entirely.
mod balmoral;
mod bone_market;
mod feeders;
mod palaeontology;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::GrindError;
use crate::rules::GameRules;
use crate::stats::{Stat, Stats};
use crate::step::Step;

pub use balmoral::{BalmoralTables, WoodsStrategy, balmoral_tables};

/// Extra positional parameter passed to one step's builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepParam {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for StepParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Everything a builder may read.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub stats: &'a Stats,
    pub rules: &'a GameRules,
    pub params: &'a [StepParam],
}

impl<'a> BuildContext<'a> {
    #[must_use]
    pub const fn new(stats: &'a Stats, rules: &'a GameRules) -> Self {
        Self {
            stats,
            rules,
            params: &[],
        }
    }

    #[must_use]
    pub const fn with_params(mut self, params: &'a [StepParam]) -> Self {
        self.params = params;
        self
    }

    /// # Errors
    ///
    /// Returns [`GrindError::MissingStat`] when the stat is absent.
    pub fn stat(&self, stat: Stat) -> Result<f64, GrindError> {
        self.stats.require(stat)
    }

    /// Text parameter at `index`, if supplied.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::InvalidParameter`] when the slot holds a non-text value.
    pub fn text_param(&self, step: &str, index: usize) -> Result<Option<&'a str>, GrindError> {
        match self.params.get(index) {
            None => Ok(None),
            Some(StepParam::Text(text)) => Ok(Some(text.as_str())),
            Some(other) => Err(GrindError::InvalidParameter {
                step: step.to_string(),
                reason: format!("parameter {index} must be text, got `{other}`"),
            }),
        }
    }

    /// Numeric parameter at `index`, if supplied. Flags read as 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::InvalidParameter`] when the slot holds text.
    pub fn number_param(&self, step: &str, index: usize) -> Result<Option<f64>, GrindError> {
        match self.params.get(index) {
            None => Ok(None),
            Some(StepParam::Number(number)) => Ok(Some(*number)),
            Some(StepParam::Flag(flag)) => Ok(Some(f64::from(u8::from(*flag)))),
            Some(StepParam::Text(text)) => Err(GrindError::InvalidParameter {
                step: step.to_string(),
                reason: format!("parameter {index} must be numeric, got `{text}`"),
            }),
        }
    }
}

/// Builder contract for one catalog entry.
pub type StepBuilder = fn(&BuildContext<'_>) -> Result<Option<Step>, GrindError>;

/// Source of steps for the solver.
pub trait StepSource {
    /// Build the named step.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::UnknownStep`] for names the source does not know,
    /// and any error the builder raises.
    fn build(&self, name: &str, ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError>;

    /// Whether `name` resolves.
    fn contains(&self, name: &str) -> bool;

    /// Every known step name, sorted.
    fn names(&self) -> Vec<&str>;
}

/// Registry of named builders.
#[derive(Clone, Default)]
pub struct Catalog {
    builders: BTreeMap<String, StepBuilder>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("steps", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Catalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register or replace a builder.
    pub fn register(&mut self, name: impl Into<String>, builder: StepBuilder) -> &mut Self {
        self.builders.insert(name.into(), builder);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// The bundled recipes for Balmoral, the Bone Market and their feeders.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        balmoral::register(&mut catalog);
        bone_market::register(&mut catalog);
        palaeontology::register(&mut catalog);
        feeders::register(&mut catalog);
        catalog
    }
}

impl StepSource for Catalog {
    fn build(&self, name: &str, ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| GrindError::UnknownStep(name.to_string()))?;
        builder(ctx)
    }

    fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    fn names(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }
}

/// Steps of the mammoth ranching cycle, plus any extra steps.
#[must_use]
pub fn ranching_cycle(extra: &[&str]) -> Vec<String> {
    [
        "Get Mammoth",
        "Get 7Necks",
        "Generator Skeleton",
        "Sell to Entrepreneur",
        "Sell to Palaeontologist",
        "Sell to Zailor",
        "Sell to Naive",
        "Medium Larceny",
        "Painting",
    ]
    .iter()
    .chain(extra)
    .map(|name| (*name).to_string())
    .collect()
}
