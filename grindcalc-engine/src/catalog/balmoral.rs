//! Balmoral woods: sourcing skeletons and painting.
//!
//! Wandering averages come from simulating 1e7 trips through the woods per
//! Player of Chess score, assuming the woods are only darkened when needed.
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

use super::{BuildContext, Catalog};
use crate::constants::BALMORAL_MAX_CHESS;
use crate::error::GrindError;
use crate::numbers::{count_to_f64, score_to_index};
use crate::probability::{binomial_pmf, narrow};
use crate::resource::Resource;
use crate::stats::Stat;
use crate::step::Step;

const DEFAULT_BALMORAL_DATA: &str = include_str!("../../data/balmoral.json");

const TABLE_LEN: usize = BALMORAL_MAX_CHESS + 1;

/// Averages indexed by Player of Chess score (0..=10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalmoralTables {
    /// Actions wandering when sourcing a Mammoth Ribcage.
    pub mammoth_wander: [f64; TABLE_LEN],
    /// Actions wandering when sourcing a Skeleton with Seven Necks.
    pub necks_wander: [f64; TABLE_LEN],
    /// Chance of having to darken the woods for a Skeleton with Seven Necks.
    pub necks_darken: [f64; TABLE_LEN],
}

impl BalmoralTables {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_BALMORAL_DATA).unwrap_or_else(|_| Self::fallback())
    }

    fn fallback() -> Self {
        Self {
            mammoth_wander: [
                6.0, 5.538, 5.149, 4.831, 4.594, 4.461, 4.471, 4.694, 5.236, 6.261, 8.0,
            ],
            necks_wander: [
                5.0, 5.523, 6.0, 6.339, 6.499, 6.484, 6.327, 6.074, 5.769, 5.425, 5.0,
            ],
            necks_darken: [
                1.0, 0.974, 0.852, 0.647, 0.42, 0.227, 0.096, 0.029, 0.005, 0.0002, 0.0,
            ],
        }
    }
}

#[must_use]
pub fn balmoral_tables() -> &'static BalmoralTables {
    static TABLES: OnceLock<BalmoralTables> = OnceLock::new();
    TABLES.get_or_init(BalmoralTables::load_from_static)
}

/// When to darken the woods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WoodsStrategy {
    /// Pick whichever of the two is cheaper at the current score.
    #[default]
    Best,
    /// Darken straight away.
    Hasty,
    /// Wander first and darken only when forced.
    Patient,
}

impl FromStr for WoodsStrategy {
    type Err = GrindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(Self::Best),
            "hasty" => Ok(Self::Hasty),
            "patient" => Ok(Self::Patient),
            other => Err(GrindError::Parse {
                what: "woods strategy",
                reason: format!("`{other}` is not one of best, hasty, patient"),
            }),
        }
    }
}

impl WoodsStrategy {
    fn from_ctx(ctx: &BuildContext<'_>, step: &str) -> Result<Self, GrindError> {
        match ctx.text_param(step, 0)? {
            None => Ok(Self::Best),
            Some(text) => text.parse().map_err(|err: GrindError| GrindError::InvalidParameter {
                step: step.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    const fn resolve(self, chess: usize, patient_from: usize) -> Self {
        match self {
            Self::Best if chess < patient_from => Self::Hasty,
            Self::Best => Self::Patient,
            other => other,
        }
    }
}

pub(super) fn register(catalog: &mut Catalog) {
    catalog
        .register("Get Mammoth", get_mammoth)
        .register("Get 7Necks", get_seven_necks)
        .register("Painting", painting);
}

fn chess_score(ctx: &BuildContext<'_>) -> Result<(f64, usize), GrindError> {
    let score = ctx
        .stat(Stat::PlayerOfChess)?
        .min(count_to_f64(BALMORAL_MAX_CHESS));
    Ok((score, score_to_index(score, BALMORAL_MAX_CHESS)))
}

fn get_mammoth(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    const NAME: &str = "Get Mammoth";
    let mut step = Step::new(
        NAME,
        &[
            (Resource::Actions, 6.96),
            (Resource::MammothRibcage, 1.0),
            (Resource::HolyRelic, 2.0),
            (Resource::Echoes, -0.16),
            (Resource::MemoryOfDistantShores, -40.0),
        ],
    );
    let (score, chess) = chess_score(ctx)?;
    let wander = narrow(6.0, score);

    match WoodsStrategy::from_ctx(ctx, NAME)?.resolve(chess, 9) {
        WoodsStrategy::Hasty => {
            let moonlit = 1.0 + 6.0 / (1.0 + wander);
            step.remove_resource(Resource::BoneScraps, 5.0);
            step.add_resource(Resource::Moonlit, moonlit);
            step.add_resource(Resource::Actions, moonlit);
        }
        _ => {
            let lost = wander.powi(8);
            let moonlit = balmoral_tables().mammoth_wander[chess] + 1.0 - lost;
            step.remove_resource(Resource::BoneScraps, 5.0 * (1.0 - lost));
            step.add_resource(Resource::Moonlit, moonlit);
            step.add_resource(Resource::Actions, moonlit);
        }
    }
    Ok(Some(step))
}

fn get_seven_necks(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    const NAME: &str = "Get 7Necks";
    let mut step = Step::new(
        NAME,
        &[
            (Resource::Actions, 7.96),
            (Resource::SkeletonWithSevenNecks, 1.0),
            (Resource::Echoes, -0.16),
            (Resource::MemoryOfDistantShores, -40.0),
        ],
    );
    let (_, chess) = chess_score(ctx)?;

    match WoodsStrategy::from_ctx(ctx, NAME)?.resolve(chess, 3) {
        WoodsStrategy::Hasty => {
            step.remove_resource(Resource::BoneScraps, 5.0);
            step.add_resource(Resource::Moonlit, 1.0);
            step.add_resource(Resource::Actions, 1.0);
        }
        _ => {
            let tables = balmoral_tables();
            let darken = tables.necks_darken[chess];
            let moonlit = tables.necks_wander[chess] + darken;
            step.remove_resource(Resource::BoneScraps, 5.0 * darken);
            step.add_resource(Resource::Moonlit, moonlit);
            step.add_resource(Resource::Actions, moonlit);
        }
    }
    Ok(Some(step))
}

fn painting(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Painting",
        &[
            (Resource::Actions, 11.0),
            (Resource::Moonlit, -12.0),
            (Resource::Echoes, 85.0),
        ],
    );
    let stroke = narrow(200.0, ctx.stat(Stat::Persuasive)?);
    // Three or more of six strokes earn the bonus.
    let bonus: f64 = (3..=6).map(|k| binomial_pmf(k, 6, stroke)).sum();
    step.add_resource(Resource::Echoes, 20.0 * bonus);
    Ok(Some(step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StepParam, StepSource};
    use crate::rules::GameRules;
    use crate::stats::Stats;

    const EPS: f64 = 1e-9;

    #[test]
    fn static_tables_parse() {
        assert_eq!(BalmoralTables::load_from_static(), BalmoralTables::fallback());
    }

    #[test]
    fn hasty_mammoth_darkens_immediately() {
        let stats = Stats::new().with(Stat::PlayerOfChess, 6.0);
        let rules = GameRules::default();
        let step = get_mammoth(&BuildContext::new(&stats, &rules))
            .unwrap()
            .unwrap();
        // narrow(6, 6) = 0.6, so 1 + 6 / 1.6 moonlit actions.
        let moonlit = 1.0 + 6.0 / 1.6;
        assert!((step.get_resource(Resource::Moonlit) - moonlit).abs() < EPS);
        assert!((step.get_resource(Resource::Actions) - (6.96 + moonlit)).abs() < EPS);
        assert!((step.get_resource(Resource::BoneScraps) + 5.0).abs() < EPS);
    }

    #[test]
    fn patient_necks_read_the_tables() {
        let stats = Stats::new().with(Stat::PlayerOfChess, 14.0);
        let rules = GameRules::default();
        let params = vec![StepParam::Text("patient".into())];
        let ctx = BuildContext::new(&stats, &rules).with_params(&params);
        let step = get_seven_necks(&ctx).unwrap().unwrap();
        assert!((step.get_resource(Resource::Moonlit) - 5.0).abs() < EPS);
        assert!(step.get_resource(Resource::BoneScraps).abs() < EPS);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let stats = Stats::new().with(Stat::PlayerOfChess, 5.0);
        let rules = GameRules::default();
        let params = vec![StepParam::Text("reckless".into())];
        let ctx = BuildContext::new(&stats, &rules).with_params(&params);
        let err = Catalog::standard().build("Get 7Necks", &ctx).unwrap_err();
        assert!(matches!(err, GrindError::InvalidParameter { .. }));
    }

    #[test]
    fn painting_needs_persuasive() {
        let stats = Stats::new();
        let rules = GameRules::default();
        let err = painting(&BuildContext::new(&stats, &rules)).unwrap_err();
        assert_eq!(err, GrindError::MissingStat(Stat::Persuasive));
    }
}
