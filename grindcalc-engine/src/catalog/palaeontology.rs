//! Palaeontology: digging, discoveries and the bone newspaper.
use super::{BuildContext, Catalog};
use crate::error::GrindError;
use crate::resource::Resource;
use crate::step::Step;

pub(super) fn register(catalog: &mut Catalog) {
    catalog
        .register("Dig at SVIII", dig_at_station_eight)
        .register("Discover Mammoth", discover_mammoth)
        .register("Discover HSkull", discover_horned_skull)
        .register("Discover JThigh", discover_jurassic_thigh)
        .register("Discover BFragments", discover_bone_fragments)
        .register("Bone Newspaper", bone_newspaper);
}

fn dig_at_station_eight(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Dig at SVIII",
        &[
            (Resource::Actions, 3.0),
            (Resource::Echoes, -3.5),
            (Resource::BoneSurvey, -150.0),
            (Resource::PalaeontologicalDiscovery, 6.0),
            (Resource::BoneFragments, 27.0),
        ],
    )))
}

/// Cashing in discoveries costs no actions.
fn discovery(name: &str, reward: Resource, amount: f64, cost: f64) -> Step {
    Step::new(
        name,
        &[(reward, amount), (Resource::PalaeontologicalDiscovery, -cost)],
    )
}

fn discover_mammoth(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(discovery(
        "Discover Mammoth",
        Resource::MammothRibcage,
        1.0,
        5.0,
    )))
}

fn discover_horned_skull(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(discovery("Discover HSkull", Resource::HornedSkull, 1.0, 1.0)))
}

fn discover_jurassic_thigh(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(discovery("Discover JThigh", Resource::JurassicThigh, 5.0, 1.0)))
}

fn discover_bone_fragments(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(discovery(
        "Discover BFragments",
        Resource::BoneFragments,
        1250.0,
        1.0,
    )))
}

/// Parameter 0 is the expected number of extra Palaeontological League
/// actions per paper.
fn bone_newspaper(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    const NAME: &str = "Bone Newspaper";
    let mut step = Step::new(
        NAME,
        &[
            (Resource::Actions, 22.5),
            (Resource::BoneSurvey, 72.0),
            (Resource::HolyRelic, 2.0),
            (Resource::WitheredTentacle, 4.5),
            (Resource::JetBlackStinger, 1.5),
            (Resource::PlasterTailBones, 1.0),
            (Resource::Scrip, 2.0),
            (Resource::Echoes, 5.0),
        ],
    );
    let league = ctx.number_param(NAME, 0)?.unwrap_or(0.0);
    if !league.is_finite() || league < 0.0 {
        return Err(GrindError::InvalidParameter {
            step: NAME.to_string(),
            reason: format!("league rate must be finite and non-negative, got {league}"),
        });
    }
    let companion = f64::from(u8::from(ctx.rules.debonair_palaeontologist));
    let extra = companion + league;
    step.add_resource(Resource::Actions, extra);
    step.add_resource(Resource::BoneSurvey, 13.0 * extra);
    step.add_resource(Resource::Echoes, 2.0 * companion);
    Ok(Some(step.with_overflow_eligible(&[
        Resource::WitheredTentacle,
        Resource::JetBlackStinger,
        Resource::PlasterTailBones,
    ])))
}
