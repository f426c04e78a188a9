//! Serializable summary of a solved cycle.
use serde::Serialize;

use crate::error::GrindError;
use crate::grind::{CycleMetrics, Grind, Outcome, RatioReport, Validity};
use crate::resource::Resource;

/// One column of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub name: String,
    /// Unit-norm solution entry.
    pub count: Option<f64>,
    /// Entry relative to the anchor step.
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrindReport {
    pub outcome: String,
    pub usable: bool,
    pub kernel_dimension: usize,
    pub resources: Vec<Resource>,
    /// Step the ratios are relative to.
    pub anchor: Option<String>,
    pub steps: Vec<StepReport>,
    pub validity: Option<Validity>,
    pub metrics: Option<CycleMetrics>,
    pub residual: Option<f64>,
    pub scrip_exchange_rate: f64,
}

impl GrindReport {
    /// Report with ratios relative to the first step, when it is not idle.
    #[must_use]
    pub fn from_grind(grind: &Grind) -> Self {
        Self::build(grind, grind.ratios().ok())
    }

    /// Report with ratios relative to `anchor`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Grind::ratios_relative_to`].
    pub fn anchored(grind: &Grind, anchor: &str) -> Result<Self, GrindError> {
        Ok(Self::build(grind, Some(grind.ratios_relative_to(anchor)?)))
    }

    fn build(grind: &Grind, ratios: Option<RatioReport>) -> Self {
        let solution = grind.solution();
        let steps = grind
            .steps()
            .iter()
            .enumerate()
            .map(|(i, name)| StepReport {
                name: name.clone(),
                count: solution.map(|s| s[i]),
                ratio: ratios.as_ref().map(|report| report.entries[i].1),
            })
            .collect();
        Self {
            outcome: grind.outcome().to_string(),
            usable: matches!(grind.outcome(), Outcome::Solved) && grind.efficiency().is_some(),
            kernel_dimension: grind.kernel_dimension(),
            resources: grind.resources().to_vec(),
            anchor: ratios.map(|report| report.anchor),
            steps,
            validity: grind.validity().cloned(),
            metrics: grind.efficiency().copied(),
            residual: grind.residual(),
            scrip_exchange_rate: grind.exchange_rate(),
        }
    }

    /// Whether the report carries a usable efficiency.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.usable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grind::GrindOptions;
    use crate::rules::SolverConfig;
    use crate::step::Step;

    #[test]
    fn report_mirrors_the_grind() {
        let grind = Grind::from_steps(
            vec![
                Step::new(
                    "Make",
                    &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 2.0)],
                ),
                Step::new(
                    "Use",
                    &[
                        (Resource::Actions, 1.0),
                        (Resource::Echoes, 3.0),
                        (Resource::GeneratorSkeleton, -1.0),
                    ],
                ),
            ],
            &GrindOptions::default(),
            &SolverConfig::default(),
        )
        .unwrap();
        let report = GrindReport::from_grind(&grind);
        assert!(report.is_usable());
        assert_eq!(report.steps.len(), 2);
        assert!((report.steps[1].ratio.unwrap() - 2.0).abs() < 1e-9);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["validity"]["status"], "valid");
        assert_eq!(json["resources"][3], "GenSkeleton");
        assert_eq!(json["anchor"], "Make");
        // 6 echoes over 3 actions.
        assert!((json["metrics"]["epa"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn anchored_report_rejects_unknown_steps() {
        let grind = Grind::from_steps(
            vec![Step::new(
                "Paint",
                &[(Resource::Actions, 11.0), (Resource::Echoes, 85.0)],
            )],
            &GrindOptions::default(),
            &SolverConfig::default(),
        )
        .unwrap();
        let report = GrindReport::anchored(&grind, "Paint").unwrap();
        assert_eq!(report.anchor.as_deref(), Some("Paint"));
        assert_eq!(report.steps[0].ratio, Some(1.0));
        assert!(matches!(
            GrindReport::anchored(&grind, "Sculpt"),
            Err(GrindError::UnknownStep(_))
        ));
    }
}
