//! Bone Market: assembling skeletons and selling them to buyers.
//!
//! Every sale is a Shadowy check whose difficulty scales with the skeleton's
//! implausibility; the chimera tier depends on a Mithridacy check.
use super::{BuildContext, Catalog};
use crate::error::GrindError;
use crate::numbers::count_to_f64;
use crate::probability::{CheckMode, binomial_distribution, binomial_pmf, broad, narrow};
use crate::resource::Resource;
use crate::stats::Stat;
use crate::step::{SaleOutcome, Step};

/// Implausibility of a chimera skeleton: low tier and high tier.
const CHIMERA_TIERS: [f64; 2] = [3.0, 6.0];
/// The same tiers after an extra limb adds two implausibility.
const LIMB_TIERS: [f64; 2] = [5.0, 8.0];

pub(super) fn register(catalog: &mut Catalog) {
    catalog
        .register("Generator Skeleton", generator_skeleton)
        .register("Sell to Entrepreneur", sell_to_entrepreneur)
        .register("Sell to Palaeontologist", sell_to_palaeontologist)
        .register("Sell to Zailor", sell_to_zailor)
        .register("Sell to Naive", sell_to_naive)
        .register("Holy Mammoth", holy_mammoth)
        .register("Ungodly Mammoth", ungodly_mammoth)
        .register("Mammoth from Hell", hell_mammoth)
        .register("Mammoth of the Zee", zee_mammoth)
        .register("Duplicate Ox Skull", duplicate_ox_skull)
        .register("Duplicate Seal Skull", duplicate_seal_skull)
        .register("Sell HRelic for BFragments", sell_relic_for_fragments)
        .register("Sell HRelic for IBiscuits", sell_relic_for_biscuits);
}

/// Chance of the low and high chimera tier.
fn chimera_split(ctx: &BuildContext<'_>) -> Result<[f64; 2], GrindError> {
    let low = narrow(11.0, ctx.stat(Stat::Mithridacy)?);
    Ok([low, 1.0 - low])
}

fn chimera_outcomes(chimera: [f64; 2], weight: f64) -> Vec<SaleOutcome> {
    CHIMERA_TIERS
        .iter()
        .zip(chimera)
        .map(|(&tier, p)| SaleOutcome::new(tier, p * weight))
        .collect()
}

/// Chimera tiers split by whether an extra attachment `kept` succeeded.
fn branched_outcomes(chimera: [f64; 2], weight: f64, kept: f64) -> Vec<SaleOutcome> {
    let mut outcomes = chimera_outcomes(chimera, weight * kept);
    outcomes.extend(
        LIMB_TIERS
            .iter()
            .zip(chimera)
            .map(|(&tier, p)| SaleOutcome::new(tier, p * weight * (1.0 - kept))),
    );
    outcomes
}

fn sell_generator(
    ctx: &BuildContext<'_>,
    mut step: Step,
    multiplier: f64,
    menace: f64,
) -> Result<Option<Step>, GrindError> {
    let outcomes = chimera_outcomes(chimera_split(ctx)?, 1.0);
    step.sell_penalty(
        ctx.rules,
        multiplier,
        ctx.stat(Stat::Shadowy)?,
        menace,
        &outcomes,
    );
    Ok(Some(step))
}

fn generator_skeleton(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Generator Skeleton",
        &[
            (Resource::Actions, 19.0),
            (Resource::SkeletonWithSevenNecks, -1.0),
            (Resource::GeneratorSkeleton, 1.0),
            (Resource::Scrip, -975.0),
        ],
    );
    step.add_resource(
        Resource::Scrip,
        5.0 * broad(200.0, ctx.stat(Stat::Persuasive)?),
    );
    Ok(Some(step))
}

fn sell_to_entrepreneur(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let step = Step::new(
        "Sell to Entrepreneur",
        &[
            (Resource::GeneratorSkeleton, -1.0),
            (Resource::Scrip, 4.0),
            (Resource::MemoryOfDistantShores, 1115.0),
        ],
    );
    sell_generator(ctx, step, 75.0, 2.0)
}

fn sell_to_palaeontologist(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let step = Step::new(
        "Sell to Palaeontologist",
        &[
            (Resource::GeneratorSkeleton, -1.0),
            (Resource::Echoes, 5.0),
            (Resource::BoneFragments, 55505.0),
        ],
    );
    sell_generator(ctx, step, 40.0, 2.0)
}

fn sell_to_zailor(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Sell to Zailor",
        &[
            (Resource::GeneratorSkeleton, -1.0),
            (Resource::Scrip, 90.0),
            (Resource::WarmAmber, 5575.0),
        ],
    );
    let limb = narrow(11.0, ctx.stat(Stat::MonstrousAnatomy)?);
    step.add_resource(
        Resource::Scrip,
        10.0 * 2.0 * limb * (1.0 - limb) + 20.0 * limb * limb,
    );
    sell_generator(ctx, step, 75.0, 2.0)
}

fn sell_to_naive(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let step = Step::new(
        "Sell to Naive",
        &[
            (Resource::GeneratorSkeleton, -1.0),
            (Resource::BoneScraps, 222.0),
        ],
    );
    sell_generator(ctx, step, 25.0, 3.5)
}

fn holy_mammoth(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    if !ctx.rules.scrimshander_knife {
        return Ok(None);
    }
    let mut step = Step::new(
        "Holy Mammoth",
        &[
            (Resource::Actions, 10.0),
            (Resource::HolyRelic, -4.0),
            (Resource::MammothRibcage, -1.0),
            (Resource::BoneFragments, -500.0),
            (Resource::Peppercaps, -10.0),
            (Resource::Echoes, 192.5),
        ],
    );
    let mith = ctx.stat(Stat::Mithridacy)?;
    let legs_fail = 1.0 - narrow(5.0, mith);
    let carve = narrow(6.0, mith);

    step.action_penalty(6.0, mith, CheckMode::Narrow);
    step.remove_resource(Resource::Echoes, 10.0 * legs_fail);
    step.menace_penalty(
        ctx.rules,
        6.0,
        ctx.stat(Stat::ArtisanOfTheRedScience)?,
        2.0,
        CheckMode::Narrow,
    );

    // Each failed leg adds two implausibility; a failed carving adds two more.
    let legs = binomial_distribution(4, legs_fail);
    let outcomes: Vec<SaleOutcome> = legs
        .iter()
        .enumerate()
        .flat_map(|(failed, &p)| {
            let base = 2.0 * count_to_f64(failed);
            [
                SaleOutcome::new(base, p * carve),
                SaleOutcome::new(base + 2.0, p * (1.0 - carve)),
            ]
        })
        .collect();
    step.sell_penalty(ctx.rules, 50.0, ctx.stat(Stat::Shadowy)?, 2.0, &outcomes);
    Ok(Some(step))
}

fn ungodly_mammoth(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Ungodly Mammoth",
        &[
            (Resource::Actions, 9.0),
            (Resource::HolyRelic, -3.0),
            (Resource::MammothRibcage, -1.0),
            (Resource::BoneFragments, -500.0),
            (Resource::Peppercaps, -10.0),
            (Resource::WitheredTentacle, -2.0),
            (Resource::Echoes, 172.5),
        ],
    );
    let anatomy = ctx.stat(Stat::MonstrousAnatomy)?;
    let legs_fail = 1.0 - narrow(5.0, ctx.stat(Stat::Mithridacy)?);
    let tentacle = narrow(1.0, anatomy);
    let tail = narrow(5.0, anatomy);

    step.remove_resource(
        Resource::Echoes,
        7.5 * legs_fail + 2.0 * (1.0 - tentacle),
    );
    step.menace_penalty(
        ctx.rules,
        6.0,
        ctx.stat(Stat::ArtisanOfTheRedScience)?,
        2.0,
        CheckMode::Narrow,
    );

    // Up to three failed legs; a failed tail adds two, a failed tentacle one.
    let mut outcomes = Vec::with_capacity(16);
    for failed in 0..4_u32 {
        let p = binomial_pmf(failed, 4, legs_fail);
        let base = 2.0 * f64::from(failed);
        for (tentacle_shift, tentacle_p) in [(0.0, tentacle), (1.0, 1.0 - tentacle)] {
            outcomes.push(SaleOutcome::new(
                base + tentacle_shift,
                p * tail * tentacle_p,
            ));
            outcomes.push(SaleOutcome::new(
                base + tentacle_shift + 2.0,
                p * (1.0 - tail) * tentacle_p,
            ));
        }
    }
    step.sell_penalty(ctx.rules, 50.0, ctx.stat(Stat::Shadowy)?, 2.0, &outcomes);
    Ok(Some(step))
}

fn hell_mammoth(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Mammoth from Hell",
        &[
            (Resource::Actions, 9.0),
            (Resource::MammothRibcage, -1.0),
            (Resource::HornedSkull, -1.0),
            (Resource::Scrip, 125.0 + 25.0 + 5.0 * 4.0),
        ],
    );
    let anatomy = ctx.stat(Stat::MonstrousAnatomy)?;
    let mith = ctx.stat(Stat::Mithridacy)?;
    let shadowy = ctx.stat(Stat::Shadowy)?;
    let limb = narrow(11.0, anatomy);
    let skull = narrow(6.0, anatomy);
    let tail = narrow(5.0, anatomy);
    let chimera = chimera_split(ctx)?;

    // Skull attached and every forelimb held.
    if ctx.rules.scrimshander_knife {
        let chance = skull * limb.powi(4);
        step.add_resource(Resource::Scrip, chance * 90.0);
        step.action_penalty(6.0, mith, CheckMode::Narrow);
        let carve = narrow(6.0, mith);
        let outcomes = branched_outcomes(chimera, chance, carve);
        step.sell_penalty(ctx.rules, 75.0, shadowy, 5.0, &outcomes);
    } else {
        let chance = skull * limb.powi(3);
        let relic = f64::from(u8::from(ctx.rules.use_hrelic_on_hell_mammoth));
        step.add_resource(Resource::Scrip, chance * (25.0 * relic - 5.0 + 90.0));
        step.remove_resource(Resource::HolyRelic, chance * relic);
        let outcomes = if ctx.rules.use_hrelic_on_hell_mammoth {
            branched_outcomes(chimera, chance, narrow(5.0, mith))
        } else {
            chimera_outcomes(chimera, chance)
        };
        step.sell_penalty(ctx.rules, 75.0, shadowy, 5.0, &outcomes);
    }

    // Skull attached, exactly one forelimb lost: a tentacle fills the gap.
    let arrangements = if ctx.rules.scrimshander_knife { 4.0 } else { 3.0 };
    let chance = arrangements * skull * (1.0 - limb) * limb.powi(3);
    step.add_resource(Resource::Scrip, chance * (90.0 + 5.0));
    step.remove_resource(Resource::WitheredTentacle, chance);
    let outcomes = branched_outcomes(chimera, chance, tail);
    step.sell_penalty(ctx.rules, 75.0, shadowy, 5.0, &outcomes);

    // Skull attached, two or more forelimbs lost: sold as is at 7-9 Antiquity.
    let mut lost_weight = 0.0;
    for held in 0..3_u32 {
        let chance = skull * binomial_pmf(held, 4, limb);
        step.add_resource(Resource::Scrip, 10.0 * chance * (7.0 + f64::from(held)));
        lost_weight += chance;
    }
    step.sell_penalty(
        ctx.rules,
        75.0,
        shadowy,
        5.0,
        &chimera_outcomes(chimera, lost_weight),
    );

    // Skull failed: four forelimbs at 7-11 Antiquity.
    let mut failed_weight = 0.0;
    for held in 0..=4_u32 {
        let chance = (1.0 - skull) * binomial_pmf(held, 4, limb);
        step.add_resource(Resource::Scrip, 5.0 * chance * (7.0 + f64::from(held)));
        failed_weight += chance;
    }
    step.sell_penalty(
        ctx.rules,
        75.0,
        shadowy,
        5.0,
        &chimera_outcomes(chimera, failed_weight),
    );
    Ok(Some(step))
}

fn zee_mammoth(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Mammoth of the Zee",
        &[
            (Resource::Actions, 9.0),
            (Resource::MammothRibcage, -1.0),
            (Resource::SealSkull, -1.0),
            (Resource::Scrip, 125.0 + 50.0 + 5.0 * 4.0),
        ],
    );
    let anatomy = ctx.stat(Stat::MonstrousAnatomy)?;
    let skull = narrow(4.0, anatomy);
    let tail = narrow(5.0, anatomy);
    let limb = narrow(11.0, anatomy);
    let chimera = chimera_split(ctx)?;

    // Skull attached: 6-9 Antiquity, a full set of limbs also takes a tail.
    let needs_tail = skull * limb.powi(4);
    let mut antiquity = 0.0;
    for held in 0..4_u32 {
        let mut chance = skull * binomial_pmf(held, 4, limb);
        if held == 3 {
            chance += needs_tail;
        }
        antiquity += (6.0 + f64::from(held)) * chance;
    }
    step.add_resource(Resource::Scrip, 10.0 * antiquity + 5.0 * needs_tail);

    // Skull failed: all limbs attached, 6-10 Antiquity.
    let failed: f64 = (0..=4_u32)
        .map(|held| (6.0 + f64::from(held)) * (1.0 - skull) * binomial_pmf(held, 4, limb))
        .sum();
    step.add_resource(Resource::Scrip, 5.0 * failed);

    let outcomes = branched_outcomes(chimera, needs_tail, tail);
    step.sell_penalty(ctx.rules, 75.0, ctx.stat(Stat::Shadowy)?, 5.0, &outcomes);
    Ok(Some(step))
}

fn duplicate_ox_skull(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Duplicate Ox Skull",
        &[
            (Resource::Actions, 1.0),
            (Resource::BoneFragments, -1000.0),
            (Resource::WarmAmber, -5.0),
            (Resource::HornedSkull, 1.0),
        ],
    )))
}

fn duplicate_seal_skull(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Duplicate Seal Skull",
        &[
            (Resource::Actions, 1.0),
            (Resource::BoneFragments, -1750.0),
            (Resource::WarmAmber, -25.0),
            (Resource::IceBiscuits, -1.0),
            (Resource::SealSkull, 1.0),
        ],
    )))
}

fn sell_relic_for_fragments(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Sell HRelic for BFragments",
        &[
            (Resource::Actions, 1.0),
            (Resource::HolyRelic, -1.0),
            (Resource::BoneFragments, 1250.0),
        ],
    )))
}

fn sell_relic_for_biscuits(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Sell HRelic for IBiscuits",
        &[
            (Resource::Actions, 1.0),
            (Resource::HolyRelic, -1.0),
            (Resource::IceBiscuits, 6.0),
        ],
    )))
}
