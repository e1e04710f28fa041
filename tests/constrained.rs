#![allow(non_snake_case)]

use cocoa::solver::*;

// x' = x + u over three steps, minimizing ½Σx² + ½Σu² from x₀ = 1.
// Without constraints u = (-0.6, -0.2); with u ≥ -0.3 both bounds are
// active at the optimum.
fn scalar_solver(cones: &[SupportedConeT], settings: DefaultSettings<f64>) -> DefaultSolver<f64> {
    let mut solver = DefaultSolver::new_lti(
        1,
        1,
        cones,
        3,
        CostTerm::Diagonal(&[1.]),
        &[0.],
        CostTerm::Diagonal(&[1.]),
        &[0.],
        &[-1.],
        &[-1.],
        &[0.],
        settings,
    )
    .unwrap();
    solver.set_initial_state(&[1.]).unwrap();
    solver
}

fn settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .max_iter(5000)
        .build()
        .unwrap()
}

fn check_bounded_solution(solver: &DefaultSolver<f64>) {
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!((solver.get_input(0).unwrap()[0] + 0.3).abs() < 1e-2);
    assert!((solver.get_input(1).unwrap()[0] + 0.3).abs() < 1e-2);
    assert!((solver.get_state(1).unwrap()[0] - 0.7).abs() < 1e-2);
    assert!((solver.get_state(2).unwrap()[0] - 0.4).abs() < 1e-2);
}

#[test]
fn test_input_lower_bound() {
    // -u - 0.3 ≤ 0
    let cone = NegativeOrthantConeT(1);
    let mut solver = scalar_solver(&[cone], settings());
    solver
        .set_constraint(&[0.], Some(&[-1.]), &[-0.3], 0, Knot::All, cone)
        .unwrap();
    solver.solve();

    check_bounded_solution(&solver);
    assert!(solver.primal_feasibility() <= 1e-4);
    assert!(solver.dual_feasibility() <= 1e-4);
    assert!(solver.complementarity() <= 1e-4);

    // both bounds are active, with nonnegative duals
    for k in 0..2 {
        assert!(solver.get_dual(k, 0).unwrap()[0] > 0.);
        assert!(solver.get_slack(k, 0).unwrap()[0].abs() < 1e-2);
    }
}

#[test]
fn test_input_norm_bound() {
    // (0.3, u) in the second-order cone, i.e. |u| ≤ 0.3
    let cone = SecondOrderConeT(2);
    let mut solver = scalar_solver(&[cone], settings());
    solver
        .set_constraint(&[0., 0.], Some(&[0., 1.]), &[0.3, 0.], 0, Knot::All, cone)
        .unwrap();
    solver.solve();

    check_bounded_solution(&solver);
}

#[test]
fn test_penalty_weights() {
    let cone = NegativeOrthantConeT(1);
    let mut solver = scalar_solver(&[cone], settings());
    solver
        .set_constraint(&[0.], Some(&[-1.]), &[-0.3], 0, Knot::All, cone)
        .unwrap();
    solver.set_penalty(10.0, 0, Knot::All).unwrap();
    solver.set_option_float(SolverOption::Rho, 0.5).unwrap();
    solver.solve();
    check_bounded_solution(&solver);

    solver.reset_penalties();
    assert_eq!(solver.get_penalty(0, 1).unwrap(), 1.0);
}

#[test]
fn test_max_iterations() {
    let cone = NegativeOrthantConeT(1);
    let mut solver = scalar_solver(&[cone], DefaultSettings::default());
    solver
        .set_constraint(&[0.], Some(&[-1.]), &[-0.3], 0, Knot::All, cone)
        .unwrap();
    solver.set_option_int(SolverOption::MaxIter, 1).unwrap();
    solver.solve();

    assert_eq!(solver.status(), SolverStatus::MaxIterations);
    assert_eq!(solver.iterations(), 1);
}

#[test]
fn test_infeasible_equality() {
    // x₀ is pinned to 1 while x₀ - 2 = 0 is required
    let cone = ZeroConeT(1);
    let mut solver = DefaultSolver::<f64>::new(
        &[1, 1],
        &[1],
        &[vec![cone], vec![]],
        SolverFlags::default(),
        settings(),
    )
    .unwrap();
    solver
        .set_state_cost(CostTerm::Diagonal(&[1.]), &[0.], Knot::All)
        .unwrap();
    solver
        .set_input_cost(CostTerm::Diagonal(&[1.]), &[0.], Knot::All)
        .unwrap();
    solver
        .set_dynamics(&[-1.], &[-1.], None, None, &[0.], 1.0, Knot::All)
        .unwrap();
    solver
        .set_constraint(&[1.], None, &[-2.], 0, Knot::Step(0), cone)
        .unwrap();
    solver.set_initial_state(&[1.]).unwrap();
    solver.solve();

    assert_eq!(solver.status(), SolverStatus::Infeasible);
    assert!(solver.iterations() < 100);
    assert!(solver.primal_feasibility() > 0.5);
}

#[test]
fn test_singular_kkt_system() {
    // no input cost and no constraints leave u unbounded
    let mut solver = DefaultSolver::<f64>::new(
        &[1, 1],
        &[1],
        &[vec![], vec![]],
        SolverFlags::default(),
        DefaultSettings::default(),
    )
    .unwrap();
    solver.solve();

    assert_eq!(solver.status(), SolverStatus::Infeasible);
    assert_eq!(solver.iterations(), 0);
}

#[test]
fn test_warm_start_and_reset() {
    let cone = NegativeOrthantConeT(1);
    let mut solver = scalar_solver(&[cone], settings());
    solver
        .set_constraint(&[0.], Some(&[-1.]), &[-0.3], 0, Knot::All, cone)
        .unwrap();

    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    let cold = solver.iterations();

    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!(solver.iterations() <= cold);

    solver.reset();
    assert_eq!(solver.get_input(0).unwrap(), &[0.]);
    solver.solve();
    assert_eq!(solver.iterations(), cold);

    solver.reset_duals();
    assert_eq!(solver.get_dual(0, 0).unwrap(), &[0.]);
    assert_eq!(solver.get_dynamics_dual(1).unwrap(), &[0.]);
}

#[test]
fn test_horizon_change() {
    let mut solver = scalar_solver(&[], DefaultSettings::default());
    solver.change_horizon_length(2).unwrap();
    solver.solve();

    // two steps: u = -½
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert_eq!(solver.get_horizon_length(), 2);
    assert!((solver.get_input(0).unwrap()[0] + 0.5).abs() < 1e-10);
    assert!(solver.get_input(1).is_err());
}
