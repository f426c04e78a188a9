//! Resource feeders: Helicon rounds and casing.
use super::{BuildContext, Catalog};
use crate::error::GrindError;
use crate::probability::narrow;
use crate::resource::Resource;
use crate::stats::Stat;
use crate::step::Step;

pub(super) fn register(catalog: &mut Catalog) {
    catalog
        .register("Basic Helicon Round", basic_helicon_round)
        .register("Tentacle Helicon Round 1", tentacle_helicon_round)
        .register("Medium Larceny", medium_larceny);
}

fn basic_helicon_round(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Basic Helicon Round",
        &[
            (Resource::Actions, 6.0),
            (Resource::Peppercaps, 25.0),
            (Resource::Echoes, 0.5),
            (Resource::Scrip, 3.0),
            (Resource::CasingProgress, 15.0),
        ],
    )))
}

/// Trades the casing card for a Shapeling Arts gamble on tentacles.
fn tentacle_helicon_round(ctx: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    let mut step = Step::new(
        "Tentacle Helicon Round 1",
        &[
            (Resource::Actions, 6.0),
            (Resource::Peppercaps, 25.0),
            (Resource::Echoes, 0.5),
            (Resource::Scrip, 2.0),
        ],
    );
    let grown = narrow(4.0, ctx.stat(Stat::ShapelingArts)?);
    step.add_resource(Resource::Scrip, 3.0 * grown);
    step.add_resource(Resource::WitheredTentacle, 9.0 * grown);
    step.remove_resource(Resource::WarmAmber, 15.0 * grown);
    Ok(Some(step.with_overflow_eligible(&[
        Resource::WitheredTentacle,
        Resource::Peppercaps,
    ])))
}

fn medium_larceny(_: &BuildContext<'_>) -> Result<Option<Step>, GrindError> {
    Ok(Some(Step::new(
        "Medium Larceny",
        &[
            (Resource::Actions, 1.0),
            (Resource::Echoes, 27.5),
            (Resource::CasingProgress, -36.0),
        ],
    )))
}
