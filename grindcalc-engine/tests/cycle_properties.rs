use grindcalc_engine::linalg::dot;
use grindcalc_engine::{Grind, GrindOptions, Outcome, Resource, SolverConfig, Step, Validity};

const EPS: f64 = 1e-9;

fn solve(steps: Vec<Step>) -> Grind {
    Grind::from_steps(steps, &GrindOptions::default(), &SolverConfig::default()).unwrap()
}

fn chain() -> Vec<Step> {
    vec![
        Step::new(
            "Source Necks",
            &[
                (Resource::Actions, 8.0),
                (Resource::Echoes, -0.16),
                (Resource::SkeletonWithSevenNecks, 1.0),
                (Resource::MemoryOfDistantShores, -40.0),
            ],
        ),
        Step::new(
            "Assemble",
            &[
                (Resource::Actions, 19.0),
                (Resource::SkeletonWithSevenNecks, -1.0),
                (Resource::GeneratorSkeleton, 1.0),
                (Resource::Scrip, -975.0),
            ],
        ),
        Step::new(
            "Sell",
            &[
                (Resource::Actions, 2.5),
                (Resource::GeneratorSkeleton, -1.0),
                (Resource::Scrip, 4.0),
                (Resource::MemoryOfDistantShores, 1115.0),
            ],
        ),
        Step::new(
            "Spend Memories",
            &[
                (Resource::Actions, 1.0),
                (Resource::MemoryOfDistantShores, -50.0),
                (Resource::Echoes, 60.0),
            ],
        ),
    ]
}

#[test]
fn single_kernel_solution_balances_every_non_objective_row() {
    let grind = solve(chain());
    assert_eq!(grind.kernel_dimension(), 1);
    let solution = grind.solution().unwrap();
    let matrix = grind.matrix();
    for row in 3..matrix.rows() {
        assert!(
            dot(matrix.row(row), solution).abs() < EPS,
            "{} does not balance",
            grind.resources()[row]
        );
    }
    assert!(grind.residual().unwrap() < EPS);
    assert_eq!(grind.validity(), Some(&Validity::Valid));
}

#[test]
fn production_without_consumer_is_not_practicable() {
    let grind = solve(vec![
        Step::new("A", &[(Resource::Actions, 1.0), (Resource::WarmAmber, 1.0)]),
        Step::new("B", &[(Resource::Actions, 1.0), (Resource::WarmAmber, 1.0)]),
    ]);
    assert_eq!(grind.outcome(), &Outcome::Solved);
    assert!(matches!(
        grind.validity(),
        Some(Validity::NotPracticable { .. })
    ));
    assert!(grind.efficiency().is_none());
}

#[test]
fn redundant_multiple_is_idle_not_a_failure() {
    let grind = solve(vec![
        Step::new(
            "Make",
            &[
                (Resource::Actions, 1.0),
                (Resource::Echoes, 1.0),
                (Resource::GeneratorSkeleton, 1.0),
            ],
        ),
        Step::new(
            "Use",
            &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, -1.0)],
        ),
        Step::new(
            "Use Twice",
            &[(Resource::Actions, 2.0), (Resource::GeneratorSkeleton, -2.0)],
        ),
    ]);
    assert_eq!(grind.kernel_dimension(), 2);
    assert_eq!(grind.outcome(), &Outcome::Solved);
    match grind.validity() {
        Some(Validity::UnnecessarySteps { idle }) => assert_eq!(idle.len(), 1),
        other => panic!("expected an idle step, got {other:?}"),
    }
    assert!((grind.efficiency().unwrap().epa - 0.5).abs() < EPS);
}

#[test]
fn metrics_derive_from_matrix_and_solution() {
    let config = SolverConfig::default();
    let grind = Grind::from_steps(chain(), &GrindOptions::default(), &config).unwrap();
    let s = grind.solution().unwrap();
    let m = grind.matrix();
    let actions = dot(m.row(0), s);
    let echoes = dot(m.row(1), s);
    let scrip = dot(m.row(2), s);
    let metrics = grind.efficiency().unwrap();
    assert!((metrics.epa - echoes / actions).abs() < EPS);
    assert!(
        (metrics.epa_total - (echoes + config.scrip_exchange_rate * scrip) / actions).abs() < EPS
    );
    assert!((metrics.spa - scrip / actions).abs() < EPS);
}

#[test]
fn identical_inputs_solve_identically() {
    let first = solve(chain());
    let second = solve(chain());
    assert_eq!(first, second);
    assert_eq!(first.solution(), second.solution());
}

#[test]
fn objective_only_steps_leave_a_full_kernel() {
    let grind = solve(vec![
        Step::new("Cheap", &[(Resource::Actions, 1.0), (Resource::Echoes, 2.0)]),
        Step::new("Dear", &[(Resource::Actions, 2.0), (Resource::Echoes, 3.0)]),
        Step::new("Scrip", &[(Resource::Actions, 1.0), (Resource::Scrip, 1.0)]),
    ]);
    assert_eq!(grind.resources(), &Resource::OBJECTIVES);
    assert_eq!(grind.kernel_dimension(), 3);
    assert_eq!(grind.outcome(), &Outcome::Solved);
    assert_eq!(
        grind.validity(),
        Some(&Validity::UnnecessarySteps {
            idle: vec!["Dear".to_string(), "Scrip".to_string()]
        })
    );
    assert!((grind.efficiency().unwrap().epa - 2.0).abs() < EPS);
}

#[test]
fn two_step_widget_cycle() {
    let grind = solve(vec![
        Step::new(
            "A",
            &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, 2.0)],
        ),
        Step::new(
            "B",
            &[(Resource::Actions, 1.0), (Resource::GeneratorSkeleton, -1.0)],
        ),
    ]);
    let s = grind.solution().unwrap();
    // The intermediate row balances: 2 * A - B = 0.
    assert!((2.0 * s[0] - s[1]).abs() < EPS);
    assert!(grind.efficiency().unwrap().epa.abs() < EPS);
    let ratios = grind.ratios().unwrap();
    assert!((ratios.entries[1].1 - 2.0).abs() < EPS);
}

#[test]
fn empty_cycle_has_no_solution() {
    let grind = solve(Vec::new());
    assert_eq!(grind.outcome(), &Outcome::NoCycle);
    assert_eq!(grind.kernel_dimension(), 0);
    assert!(grind.residual().is_none());
}
