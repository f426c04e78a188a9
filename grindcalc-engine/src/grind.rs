//! Cycle solver.
//!
//! A [`Grind`] assembles the requested steps into a resource x step matrix,
//! finds the step-count combinations that leave every non-objective resource
//! balanced, and picks the one with the best echoes per action.
//!
//! Solvability is part of the result rather than an error: callers inspect
//! [`Grind::outcome`] and [`Grind::validity`] before trusting
//! [`Grind::efficiency`].
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{BuildContext, StepParam, StepSource};
use crate::constants::{OBJECTIVE_ROWS, SOLUTION_ZERO_EPS};
use crate::error::{GrindError, OptimizerError};
use crate::linalg::{self, LinearProgram, Matrix, dot, norm};
use crate::numbers::sign;
use crate::resource::Resource;
use crate::rules::{GameRules, SolverConfig};
use crate::stats::Stats;
use crate::step::Step;

/// Price paid for each discarded unit of an overflowed resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverflowCredit {
    pub resource: Resource,
    pub price: f64,
}

/// One requested overflow column.
///
/// Deserializes from a bare resource name or a `{resource, credit}` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "OverflowRepr")]
pub struct Overflow {
    pub resource: Resource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<OverflowCredit>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverflowRepr {
    Bare(Resource),
    Full {
        resource: Resource,
        #[serde(default)]
        credit: Option<OverflowCredit>,
    },
}

impl From<OverflowRepr> for Overflow {
    fn from(repr: OverflowRepr) -> Self {
        match repr {
            OverflowRepr::Bare(resource) => resource.into(),
            OverflowRepr::Full { resource, credit } => Self { resource, credit },
        }
    }
}

impl From<Resource> for Overflow {
    fn from(resource: Resource) -> Self {
        Self {
            resource,
            credit: None,
        }
    }
}

impl Overflow {
    fn step(self) -> Step {
        Step::overflow(
            self.resource,
            self.credit.map(|credit| (credit.resource, credit.price)),
        )
    }
}

/// Per-solve options besides stats and rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrindOptions {
    pub overflow: Vec<Overflow>,
    pub blacklist: Vec<Resource>,
    /// Positional builder parameters keyed by step name.
    pub params: BTreeMap<String, Vec<StepParam>>,
    /// Reject overflow for resources no active step marks as overflow-eligible.
    pub strict_overflow: bool,
}

impl GrindOptions {
    #[must_use]
    pub fn with_overflow(mut self, resource: Resource) -> Self {
        self.overflow.push(resource.into());
        self
    }

    #[must_use]
    pub fn with_credited_overflow(mut self, resource: Resource, substitute: Resource, price: f64) -> Self {
        self.overflow.push(Overflow {
            resource,
            credit: Some(OverflowCredit {
                resource: substitute,
                price,
            }),
        });
        self
    }

    #[must_use]
    pub fn with_blacklist(mut self, resource: Resource) -> Self {
        self.blacklist.push(resource);
        self
    }

    #[must_use]
    pub fn with_params(mut self, step: impl Into<String>, params: Vec<StepParam>) -> Self {
        self.params.insert(step.into(), params);
        self
    }

    #[must_use]
    pub const fn with_strict_overflow(mut self) -> Self {
        self.strict_overflow = true;
        self
    }

    fn validate(&self) -> Result<(), GrindError> {
        if let Some(objective) = self.blacklist.iter().find(|r| r.is_objective()) {
            return Err(GrindError::ObjectiveBlacklisted(objective.to_string()));
        }
        if let Some(overflow) = self
            .overflow
            .iter()
            .find(|o| self.blacklist.contains(&o.resource))
        {
            return Err(GrindError::BlacklistedOverflow(overflow.resource.to_string()));
        }
        Ok(())
    }
}

/// How the solve ended numerically.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A solution vector exists; see [`Validity`] for whether it is usable.
    Solved,
    /// Kernel dimension 0: no combination balances.
    NoCycle,
    /// Kernel dimension above 1 and the optimizer gave up.
    OptimizerFailed(OptimizerError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solved => f.write_str("solved"),
            Self::NoCycle => f.write_str("no self-sustaining cycle"),
            Self::OptimizerFailed(err) => write!(f, "optimizer failed: {err}"),
        }
    }
}

/// Sign check of a solution vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validity {
    Valid,
    /// Solvable without these steps.
    UnnecessarySteps { idle: Vec<String> },
    /// These steps would have to run backwards.
    NotPracticable { reversed: Vec<String> },
}

impl Validity {
    #[must_use]
    pub const fn is_practicable(&self) -> bool {
        !matches!(self, Self::NotPracticable { .. })
    }
}

/// Per-action efficiency of a solved cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    /// Echoes per action.
    pub epa: f64,
    /// Echoes plus exchanged Scrip per action.
    pub epa_total: f64,
    /// Scrip per action.
    pub spa: f64,
}

/// Solution entries relative to one anchor step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioReport {
    pub anchor: String,
    pub entries: Vec<(String, f64)>,
}

impl fmt::Display for RatioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, ratio) in &self.entries {
            writeln!(f, "{name}: {ratio:.15}")?;
        }
        Ok(())
    }
}

/// A solved (or unsolvable) cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Grind {
    resources: Vec<Resource>,
    steps: Vec<String>,
    matrix: Matrix,
    exchange_rate: f64,
    ineligible_overflow: Vec<Resource>,
    kernel_dimension: usize,
    outcome: Outcome,
    solution: Option<Vec<f64>>,
    validity: Option<Validity>,
    metrics: Option<CycleMetrics>,
}

impl Grind {
    /// Build every requested step from `source` and solve the cycle.
    ///
    /// Steps whose builder reports them inapplicable are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError`] for unknown steps, missing stats, bad builder
    /// parameters, an invalid config, or a blacklisted objective.
    pub fn new<S, N>(
        source: &S,
        stats: &Stats,
        steps: &[N],
        options: &GrindOptions,
        rules: &GameRules,
        config: &SolverConfig,
    ) -> Result<Self, GrindError>
    where
        S: StepSource + ?Sized,
        N: AsRef<str>,
    {
        for name in options.params.keys() {
            if !steps.iter().any(|step| step.as_ref() == name) {
                log::warn!("parameters supplied for `{name}`, which is not in the cycle");
            }
        }
        let mut built = Vec::with_capacity(steps.len());
        for name in steps {
            let name = name.as_ref();
            let params = options.params.get(name).map_or(&[][..], Vec::as_slice);
            let ctx = BuildContext::new(stats, rules).with_params(params);
            match source.build(name, &ctx)? {
                Some(step) => built.push(step),
                None => log::debug!("step `{name}` is inapplicable under the current rules"),
            }
        }
        Self::from_steps(built, options, config)
    }

    /// Solve a cycle over already-built steps.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError`] for an invalid config or conflicting options,
    /// and [`GrindError::OverflowNotEligible`] under strict overflow.
    pub fn from_steps(
        steps: Vec<Step>,
        options: &GrindOptions,
        config: &SolverConfig,
    ) -> Result<Self, GrindError> {
        config.validate()?;
        options.validate()?;

        let ineligible_overflow: Vec<Resource> = options
            .overflow
            .iter()
            .map(|o| o.resource)
            .filter(|resource| {
                !steps
                    .iter()
                    .any(|step| step.overflow_eligible.contains(resource))
            })
            .collect();
        if let Some(resource) = ineligible_overflow.first() {
            if options.strict_overflow {
                return Err(GrindError::OverflowNotEligible(resource.to_string()));
            }
            for resource in &ineligible_overflow {
                log::warn!("overflow requested for `{resource}`, which no step marks as surplus");
            }
        }

        let overflow: Vec<Step> = options.overflow.iter().map(|o| o.step()).collect();
        let columns: Vec<&Step> = steps.iter().chain(&overflow).collect();
        let gains: Vec<f64> = columns
            .iter()
            .map(|step| step.resources.gain(config.scrip_exchange_rate))
            .collect();

        let mut touched = [false; Resource::COUNT];
        for resource in columns.iter().flat_map(|step| step.resources.touched()) {
            touched[resource.index()] = true;
        }
        // Objective rows stay so the first three rows are always
        // Actions, Echoes, Scrip.
        let resources: Vec<Resource> = Resource::ALL
            .iter()
            .copied()
            .filter(|&resource| {
                resource.is_objective()
                    || (!options.blacklist.contains(&resource) && touched[resource.index()])
            })
            .collect();
        let rows: Vec<Vec<f64>> = resources
            .iter()
            .map(|&resource| columns.iter().map(|step| step.get_resource(resource)).collect())
            .collect();
        let matrix = Matrix::from_rows(&rows)?;
        let names: Vec<String> = columns.iter().map(|step| step.name.clone()).collect();
        log::debug!(
            "assembled {} resources x {} steps ({} overflow)",
            resources.len(),
            names.len(),
            overflow.len()
        );

        let mut grind = Self {
            resources,
            steps: names,
            matrix,
            exchange_rate: config.scrip_exchange_rate,
            ineligible_overflow,
            kernel_dimension: 0,
            outcome: Outcome::NoCycle,
            solution: None,
            validity: None,
            metrics: None,
        };
        grind.solve(&gains, config);
        Ok(grind)
    }

    fn solve(&mut self, gains: &[f64], config: &SolverConfig) {
        let balance = self.matrix.rows_from(OBJECTIVE_ROWS);
        let kernel = if self.steps.is_empty() {
            Vec::new()
        } else {
            linalg::svd(&balance).null_space(balance.rows(), config.zero_tolerance)
        };
        self.kernel_dimension = kernel.len();
        log::debug!("kernel dimension {}", self.kernel_dimension);

        let solution = match kernel.as_slice() {
            [] => {
                log::warn!("no self-sustaining cycle among {} steps", self.steps.len());
                self.outcome = Outcome::NoCycle;
                return;
            }
            [only] => orient(only.clone()),
            basis => match self.optimize(basis, gains, config.max_iterations) {
                Ok(solution) => solution,
                Err(err) => {
                    log::error!("cycle optimizer failed: {err}");
                    self.outcome = Outcome::OptimizerFailed(err);
                    return;
                }
            },
        };
        let solution = clean(solution);

        let validity = self.classify(&solution);
        match &validity {
            Validity::Valid => {}
            Validity::UnnecessarySteps { idle } => {
                log::warn!("cycle does not need: {}", idle.join(", "));
            }
            Validity::NotPracticable { reversed } => {
                log::error!("cycle is not practicable, reversed: {}", reversed.join(", "));
            }
        }
        self.metrics = self.measure(&solution);
        self.outcome = Outcome::Solved;
        self.solution = Some(solution);
        self.validity = Some(validity);
    }

    /// Minimize actions per gain over non-negative combinations of the basis.
    ///
    /// When no such combination earns a positive gain, the cheapest
    /// non-negative combination per total step count is taken instead.
    fn optimize(
        &self,
        basis: &[Vec<f64>],
        gains: &[f64],
        max_pivots: usize,
    ) -> Result<Vec<f64>, OptimizerError> {
        let n = self.steps.len();
        let actions = self.matrix.row(0);

        let result = match linalg::minimize(&charnes_cooper(basis, actions, gains), max_pivots) {
            Ok(result) => {
                check_seed(basis, actions, gains, result.value)?;
                result
            }
            Err(OptimizerError::NoPositiveGain) => {
                log::warn!("no balanced mix earns a positive gain; taking the cheapest one");
                let counts = vec![1.0; n];
                linalg::minimize(&charnes_cooper(basis, actions, &counts), max_pivots)?
            }
            Err(err) => return Err(err),
        };

        let d = basis.len();
        let mut solution = result.x[2 * d..].to_vec();
        let length = norm(&solution);
        if length > 0.0 {
            for value in &mut solution {
                *value /= length;
            }
        }
        log::info!(
            "optimizer converged in {} pivots at {:.6} actions per unit",
            result.pivots,
            result.value
        );
        Ok(solution)
    }

    fn classify(&self, solution: &[f64]) -> Validity {
        let by_sign = |wanted: i32| -> Vec<String> {
            self.steps
                .iter()
                .zip(solution)
                .filter(|(_, value)| sign(**value) == wanted)
                .map(|(name, _)| name.clone())
                .collect()
        };
        let reversed = by_sign(-1);
        if !reversed.is_empty() {
            return Validity::NotPracticable { reversed };
        }
        let idle = by_sign(0);
        if idle.is_empty() {
            Validity::Valid
        } else {
            Validity::UnnecessarySteps { idle }
        }
    }

    fn measure(&self, solution: &[f64]) -> Option<CycleMetrics> {
        let actions = dot(self.matrix.row(0), solution);
        let echoes = dot(self.matrix.row(1), solution);
        let scrip = dot(self.matrix.row(2), solution);
        if !(actions.is_finite() && actions > 0.0) {
            log::warn!("cycle spends {actions} actions; efficiency undefined");
            return None;
        }
        Some(CycleMetrics {
            epa: echoes / actions,
            epa_total: self.exchange_rate.mul_add(scrip, echoes) / actions,
            spa: scrip / actions,
        })
    }

    /// Efficiency of a usable cycle.
    ///
    /// `None` when there is no solution or the solution is not practicable.
    #[must_use]
    pub fn efficiency(&self) -> Option<&CycleMetrics> {
        match &self.validity {
            Some(validity) if validity.is_practicable() => self.metrics.as_ref(),
            _ => None,
        }
    }

    /// Largest imbalance of any non-objective row under the solution.
    #[must_use]
    pub fn residual(&self) -> Option<f64> {
        let solution = self.solution.as_ref()?;
        let imbalance = self.matrix.rows_from(OBJECTIVE_ROWS).mul_vec(solution).ok()?;
        Some(imbalance.iter().fold(0.0, |acc: f64, v| acc.max(v.abs())))
    }

    /// Solution entries divided by the first step's entry.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::NoSolution`] without a solution and
    /// [`GrindError::ZeroReference`] when the first step is idle.
    pub fn ratios(&self) -> Result<RatioReport, GrindError> {
        let anchor = self.steps.first().ok_or(GrindError::NoSolution)?;
        self.ratios_relative_to(anchor)
    }

    /// Solution entries divided by the named step's entry.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::NoSolution`], [`GrindError::UnknownStep`] or
    /// [`GrindError::ZeroReference`].
    pub fn ratios_relative_to(&self, step: &str) -> Result<RatioReport, GrindError> {
        let solution = self.solution.as_ref().ok_or(GrindError::NoSolution)?;
        let index = self
            .steps
            .iter()
            .position(|name| name == step)
            .ok_or_else(|| GrindError::UnknownStep(step.to_string()))?;
        let reference = solution[index];
        if reference == 0.0 {
            return Err(GrindError::ZeroReference(step.to_string()));
        }
        Ok(RatioReport {
            anchor: step.to_string(),
            entries: self
                .steps
                .iter()
                .zip(solution)
                .map(|(name, value)| (name.clone(), value / reference))
                .collect(),
        })
    }

    /// Rows of the matrix, Actions, Echoes and Scrip first.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Active steps then overflow steps, one per matrix column.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    #[must_use]
    pub const fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    #[must_use]
    pub fn solution(&self) -> Option<&[f64]> {
        self.solution.as_deref()
    }

    #[must_use]
    pub const fn kernel_dimension(&self) -> usize {
        self.kernel_dimension
    }

    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    #[must_use]
    pub const fn validity(&self) -> Option<&Validity> {
        self.validity.as_ref()
    }

    #[must_use]
    pub const fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    /// Requested overflow resources that no active step marks as surplus.
    #[must_use]
    pub fn ineligible_overflow(&self) -> &[Resource] {
        &self.ineligible_overflow
    }
}

/// Linear program minimizing `actions . s` with `weights . s = 1`.
///
/// With `s = B c`, the ratio `a.s / w.s` is linear-fractional in `c`.
/// Fixing `w.s = 1` turns it into an LP over `c = c+ - c-` and the slack
/// `t = B c >= 0`, whose value is the step counts themselves.
fn charnes_cooper(basis: &[Vec<f64>], actions: &[f64], weights: &[f64]) -> LinearProgram {
    let n = actions.len();
    let d = basis.len();
    let weight_of: Vec<f64> = basis.iter().map(|column| dot(weights, column)).collect();
    let actions_of: Vec<f64> = basis.iter().map(|column| dot(actions, column)).collect();

    let mut constraints = Matrix::zeros(n + 1, 2 * d + n);
    for i in 0..n {
        for (k, column) in basis.iter().enumerate() {
            constraints[(i, k)] = column[i];
            constraints[(i, d + k)] = -column[i];
        }
        constraints[(i, 2 * d + i)] = -1.0;
    }
    for k in 0..d {
        constraints[(n, k)] = weight_of[k];
        constraints[(n, d + k)] = -weight_of[k];
    }
    let mut rhs = vec![0.0; n + 1];
    rhs[n] = 1.0;
    let mut objective = vec![0.0; 2 * d + n];
    for k in 0..d {
        objective[k] = actions_of[k];
        objective[d + k] = -actions_of[k];
    }
    LinearProgram {
        objective,
        constraints,
        rhs,
    }
}

/// Reject an optimum worse than the basis column sum, when that is feasible.
fn check_seed(
    basis: &[Vec<f64>],
    actions: &[f64],
    gains: &[f64],
    found: f64,
) -> Result<(), OptimizerError> {
    let seed: Vec<f64> = (0..actions.len())
        .map(|i| basis.iter().map(|column| column[i]).sum())
        .collect();
    let seed_scale = seed.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
    let seed_gain = dot(gains, &seed);
    if seed_gain > 0.0 && seed.iter().all(|&v| v >= -SOLUTION_ZERO_EPS * seed_scale) {
        let seed_ratio = dot(actions, &seed) / seed_gain;
        if found > seed_ratio + SOLUTION_ZERO_EPS.sqrt() * seed_ratio.abs().max(1.0) {
            return Err(OptimizerError::WorseThanSeed {
                found,
                seed: seed_ratio,
            });
        }
    }
    Ok(())
}

/// Flip a null vector so its largest entry is positive.
fn orient(mut vector: Vec<f64>) -> Vec<f64> {
    let largest = vector
        .iter()
        .copied()
        .fold(0.0, |best: f64, v| if v.abs() > best.abs() { v } else { best });
    if largest < 0.0 {
        for value in &mut vector {
            *value = -*value;
        }
    }
    vector
}

/// Zero out entries that are rounding noise relative to the largest.
fn clean(mut vector: Vec<f64>) -> Vec<f64> {
    let scale = vector.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
    for value in &mut vector {
        if value.abs() <= SOLUTION_ZERO_EPS * scale {
            *value = 0.0;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn solve(steps: Vec<Step>, options: &GrindOptions) -> Grind {
        Grind::from_steps(steps, options, &SolverConfig::default()).unwrap()
    }

    #[test]
    fn two_step_cycle_balances_the_intermediate() {
        let grind = solve(
            vec![
                Step::new("Make", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 2.0)]),
                Step::new("Use", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, -1.0)]),
            ],
            &GrindOptions::default(),
        );
        assert_eq!(grind.kernel_dimension(), 1);
        assert_eq!(
            grind.resources(),
            &[
                Resource::Actions,
                Resource::Echoes,
                Resource::Scrip,
                Resource::GeneratorSkeleton
            ]
        );
        let s = grind.solution().unwrap();
        assert!((s[1] - 2.0 * s[0]).abs() < EPS);
        assert_eq!(grind.validity(), Some(&Validity::Valid));
        assert!(grind.efficiency().unwrap().epa.abs() < EPS);
        assert!(grind.residual().unwrap() < EPS);
    }

    #[test]
    fn one_way_production_is_not_practicable() {
        let grind = solve(
            vec![
                Step::new("A", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 1.0)]),
                Step::new("B", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 1.0)]),
            ],
            &GrindOptions::default(),
        );
        assert_eq!(grind.outcome(), &Outcome::Solved);
        match grind.validity() {
            Some(Validity::NotPracticable { reversed }) => assert_eq!(reversed.len(), 1),
            other => panic!("expected not practicable, got {other:?}"),
        }
        assert!(grind.solution().is_some());
        assert!(grind.efficiency().is_none());
    }

    #[test]
    fn optimizer_prefers_the_cheaper_consumer() {
        let grind = solve(
            vec![
                Step::new("Make", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 1.0)]),
                Step::new(
                    "Quick",
                    &[
                        (Resource::Actions, 1.0),
                        (Resource::Echoes, 5.0),
                        (Resource::GeneratorSkeleton, -1.0),
                    ],
                ),
                Step::new(
                    "Slow",
                    &[
                        (Resource::Actions, 2.0),
                        (Resource::Echoes, 5.0),
                        (Resource::GeneratorSkeleton, -1.0),
                    ],
                ),
            ],
            &GrindOptions::default(),
        );
        assert_eq!(grind.kernel_dimension(), 2);
        let s = grind.solution().unwrap();
        assert!((s[0] - s[1]).abs() < EPS);
        assert_eq!(s[2], 0.0);
        assert_eq!(
            grind.validity(),
            Some(&Validity::UnnecessarySteps {
                idle: vec!["Slow".to_string()]
            })
        );
        assert!((grind.efficiency().unwrap().epa - 2.5).abs() < EPS);
    }

    #[test]
    fn overflow_rescues_a_surplus() {
        let steps = || {
            vec![
                Step::new("Make", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 1.0)]),
                Step::new(
                    "Use",
                    &[
                        (Resource::Actions, 1.0),
                        (Resource::Echoes, 10.0),
                        (Resource::GeneratorSkeleton, -1.0),
                        (Resource::WitheredTentacle, 1.0),
                    ],
                ),
            ]
        };
        let stuck = solve(steps(), &GrindOptions::default());
        assert_eq!(stuck.outcome(), &Outcome::NoCycle);
        assert!(stuck.solution().is_none());
        assert!(stuck.efficiency().is_none());
        assert_eq!(stuck.ratios().unwrap_err(), GrindError::NoSolution);

        let options = GrindOptions::default().with_overflow(Resource::WitheredTentacle);
        let rescued = solve(steps(), &options);
        assert_eq!(rescued.steps().last().unwrap(), "WTentacles Overflow");
        let ratios = rescued.ratios().unwrap();
        assert!(ratios.entries.iter().all(|(_, r)| (r - 1.0).abs() < EPS));
        assert!((rescued.efficiency().unwrap().epa - 5.0).abs() < EPS);

        let blacklisted = solve(
            steps(),
            &GrindOptions::default().with_blacklist(Resource::WitheredTentacle),
        );
        assert!(!blacklisted.resources().contains(&Resource::WitheredTentacle));
        assert_eq!(blacklisted.kernel_dimension(), 1);
    }

    #[test]
    fn credited_overflow_adds_gain() {
        let options = GrindOptions::default().with_credited_overflow(
            Resource::BoneFragments,
            Resource::Echoes,
            0.01,
        );
        let grind = solve(
            vec![Step::new(
                "Dig",
                &[(Resource::Actions, 1.0), (Resource::BoneFragments, 100.0)],
            )],
            &options,
        );
        let metrics = grind.efficiency().unwrap();
        assert!((metrics.epa - 1.0).abs() < EPS);
    }

    #[test]
    fn option_conflicts_are_errors() {
        let config = SolverConfig::default();
        let err = Grind::from_steps(
            Vec::new(),
            &GrindOptions::default().with_blacklist(Resource::Scrip),
            &config,
        )
        .unwrap_err();
        assert_eq!(err, GrindError::ObjectiveBlacklisted("Scrip".to_string()));

        let conflicted = GrindOptions::default()
            .with_blacklist(Resource::Moonlit)
            .with_overflow(Resource::Moonlit);
        assert_eq!(
            Grind::from_steps(Vec::new(), &conflicted, &config).unwrap_err(),
            GrindError::BlacklistedOverflow("Moonlit".to_string())
        );
    }

    #[test]
    fn ratio_report_formats_and_guards_zero() {
        let grind = solve(
            vec![
                Step::new("Make", &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 1.0)]),
                Step::new(
                    "Quick",
                    &[
                        (Resource::Actions, 1.0),
                        (Resource::Echoes, 5.0),
                        (Resource::GeneratorSkeleton, -1.0),
                    ],
                ),
                Step::new(
                    "Slow",
                    &[
                        (Resource::Actions, 2.0),
                        (Resource::Echoes, 5.0),
                        (Resource::GeneratorSkeleton, -1.0),
                    ],
                ),
            ],
            &GrindOptions::default(),
        );
        let report = grind.ratios_relative_to("Quick").unwrap();
        assert_eq!(report.to_string().lines().next(), Some("Make: 1.000000000000000"));
        assert_eq!(
            grind.ratios_relative_to("Slow").unwrap_err(),
            GrindError::ZeroReference("Slow".to_string())
        );
        assert!(matches!(
            grind.ratios_relative_to("Nope"),
            Err(GrindError::UnknownStep(_))
        ));
    }

    #[test]
    fn overflow_deserializes_from_name_or_object() {
        let options: GrindOptions = serde_json::from_str(
            r#"{"overflow": ["WTentacles", {"resource": "BFragments", "credit": {"resource": "Echoes", "price": 0.01}}]}"#,
        )
        .unwrap();
        assert_eq!(options.overflow[0], Overflow::from(Resource::WitheredTentacle));
        assert_eq!(
            options.overflow[1].credit,
            Some(OverflowCredit {
                resource: Resource::Echoes,
                price: 0.01
            })
        );
    }

    #[test]
    fn overflow_eligibility_warns_or_rejects() {
        let surplus = |eligible: &[Resource]| {
            vec![
                Step::new(
                    "Harvest",
                    &[
                        (Resource::Actions, 1.0),
                        (Resource::Echoes, 2.0),
                        (Resource::WitheredTentacle, 3.0),
                    ],
                )
                .with_overflow_eligible(eligible),
            ]
        };
        let lenient = GrindOptions::default().with_overflow(Resource::WitheredTentacle);
        let strict = lenient.clone().with_strict_overflow();

        let marked = solve(surplus(&[Resource::WitheredTentacle]), &strict);
        assert!(marked.ineligible_overflow().is_empty());
        assert!((marked.efficiency().unwrap().epa - 2.0).abs() < EPS);

        let unmarked = solve(surplus(&[]), &lenient);
        assert_eq!(unmarked.ineligible_overflow(), &[Resource::WitheredTentacle]);
        assert_eq!(unmarked.outcome(), &Outcome::Solved);

        assert_eq!(
            Grind::from_steps(surplus(&[]), &strict, &SolverConfig::default()).unwrap_err(),
            GrindError::OverflowNotEligible("WTentacles".to_string())
        );
    }

    #[test]
    fn gainless_cycle_takes_the_cheapest_mix() {
        let grind = solve(
            vec![
                Step::new("A", &[(Resource::Actions, 1.0)]),
                Step::new("B", &[(Resource::Actions, 2.0)]),
            ],
            &GrindOptions::default(),
        );
        assert_eq!(grind.kernel_dimension(), 2);
        assert_eq!(grind.outcome(), &Outcome::Solved);
        assert_eq!(
            grind.validity(),
            Some(&Validity::UnnecessarySteps {
                idle: vec!["B".to_string()]
            })
        );
        let metrics = grind.efficiency().unwrap();
        assert!(metrics.epa.abs() < EPS);
        assert!(metrics.epa_total.abs() < EPS);
    }

    #[test]
    fn orient_and_clean() {
        assert_eq!(orient(vec![0.5, -2.0]), vec![-0.5, 2.0]);
        assert_eq!(clean(vec![1.0, 1e-15, -0.5]), vec![1.0, 0.0, -0.5]);
    }
}
