#![allow(non_snake_case)]

use cocoa::{algebra::DenseMatrix, solver::*};

// three steps over two slots: step 0 in slot 0, steps 1 and 2 share slot 1
fn custom_solver(flags: SolverFlags) -> DefaultSolver<f64> {
    let dims = [
        StageDims::new(2, 1, &[NegativeOrthantConeT(2)]).with_next(3, 2),
        StageDims::new(3, 2, &[ZeroConeT(1), SecondOrderConeT(3)]),
    ];
    DefaultSolver::new_with_custom_storage(&dims, &[0, 1, 1], flags, DefaultSettings::default())
        .unwrap()
}

#[test]
fn test_cost_round_trip() {
    let mut solver = custom_solver(SolverFlags::default());

    let Q = [2., 0.5, 0.5, 1.];
    solver
        .set_state_cost(CostTerm::Dense(&Q), &[1., -1.], Knot::Step(0))
        .unwrap();
    let (Qs, q) = solver.get_state_cost(0).unwrap();
    assert_eq!(Qs.data(), &Q);
    assert!(!Qs.is_diagonal());
    assert_eq!(q, &[1., -1.]);

    // diagonal data is expanded into dense storage
    solver
        .set_input_cost(CostTerm::Diagonal(&[3., 4.]), &[0., 1.], Knot::Step(1))
        .unwrap();
    let (R, r) = solver.get_input_cost(1).unwrap();
    assert_eq!(R.data(), &[3., 0., 0., 4.]);
    assert_eq!(r, &[0., 1.]);

    // steps 1 and 2 share their storage
    solver
        .set_state_cost(CostTerm::Diagonal(&[1., 2., 3.]), &[0.; 3], Knot::Step(2))
        .unwrap();
    assert_eq!(
        solver.get_state_cost(1).unwrap().0,
        solver.get_state_cost(2).unwrap().0
    );
}

#[test]
fn test_diagonal_costs() {
    let flags = SolverFlags {
        diagonal_costs: true,
        ..SolverFlags::default()
    };
    let mut solver = custom_solver(flags);
    assert!(matches!(
        solver.set_state_cost(CostTerm::Dense(&[1., 0., 0., 1.]), &[0., 0.], Knot::Step(0)),
        Err(SolverError::ConfigError(_))
    ));
    solver
        .set_state_cost(CostTerm::Diagonal(&[1., 2.]), &[0., 0.], Knot::Step(0))
        .unwrap();
    let (Q, _) = solver.get_state_cost(0).unwrap();
    assert!(Q.is_diagonal());
    assert_eq!(Q.data(), &[1., 2.]);
}

#[test]
fn test_dynamics_round_trip() {
    let mut solver = custom_solver(SolverFlags::default());

    // slot 0 maps two states and one input into three states and two inputs
    let A = [1., 2., 3., 4., 5., 6.];
    let B = [1., 0., 1.];
    let D = [0.5; 6];
    let f = [0.1, 0.2, 0.3];
    solver
        .set_dynamics(&A, &B, None, Some(&D), &f, 0.05, Knot::Step(0))
        .unwrap();

    let dynamics = solver.get_dynamics(0).unwrap();
    assert_eq!(dynamics.A.data(), &A);
    assert_eq!(dynamics.B.data(), &B);
    assert_eq!(dynamics.C.data(), &[1., 0., 0., 0., 1., 0., 0., 0., 1.]);
    assert_eq!(dynamics.D.data(), &D);
    assert_eq!(dynamics.f, f.to_vec());
    assert_eq!(dynamics.h, 0.05);

    assert!(matches!(
        solver.set_dynamics(&A[..4], &B, None, None, &f, 1.0, Knot::Step(0)),
        Err(SolverError::DimensionError {
            expected: 6,
            found: 4,
            ..
        })
    ));
    // a failed write leaves the data untouched
    assert_eq!(solver.get_dynamics(0).unwrap().h, 0.05);
    assert!(solver.get_dynamics(2).is_err());
}

#[test]
fn test_constraint_round_trip() {
    let mut solver = custom_solver(SolverFlags::default());

    let G = [1., 0., 0., 1.];
    solver
        .set_constraint(&G, Some(&[1., 1.]), &[-1., -1.], 0, Knot::Step(0), NegativeOrthantConeT(2))
        .unwrap();
    let c = solver.get_constraint(0, 0).unwrap();
    assert_eq!(c.G.data(), &G);
    assert_eq!(c.H.data(), &[1., 1.]);
    assert_eq!(c.h, vec![-1., -1.]);
    assert_eq!(c.rho, 1.0);

    // second constraint of the shared slot
    let G = [0.; 9];
    solver
        .set_constraint(&G, None, &[1., 0., 0.], 1, Knot::Step(1), SecondOrderConeT(3))
        .unwrap();
    assert_eq!(solver.get_constraint(1, 2).unwrap().h, vec![1., 0., 0.]);
    assert_eq!(solver.get_constraint(1, 2).unwrap().H.data(), &[0.; 6]);

    assert!(matches!(
        solver.set_constraint(&[1.; 3], None, &[0.], 2, Knot::Step(1), ZeroConeT(1)),
        Err(SolverError::IndexError { index: 2, bound: 2, .. })
    ));
    assert!(matches!(
        solver.get_constraint(0, 3),
        Err(SolverError::IndexError { index: 3, bound: 3, .. })
    ));
}

#[test]
fn test_broadcast() {
    let mut solver = custom_solver(SolverFlags::default());

    // every reachable slot must accept the data
    assert!(matches!(
        solver.set_penalty(2.0, 1, Knot::All),
        Err(SolverError::IndexError { .. })
    ));
    solver.set_penalty(2.0, 0, Knot::All).unwrap();
    for k in 0..3 {
        assert_eq!(solver.get_penalty(0, k).unwrap(), 2.0);
    }
    assert_eq!(solver.get_penalty(1, 1).unwrap(), 1.0);

    // slots of a shortened horizon are no longer reachable
    solver.change_horizon_length(1).unwrap();
    solver
        .set_state_cost(CostTerm::Diagonal(&[5., 5.]), &[0., 0.], Knot::All)
        .unwrap();
    solver.change_horizon_length(3).unwrap();
    assert_eq!(solver.get_state_cost(1).unwrap().0.data()[0], 0.);
    assert_eq!(solver.get_state_cost(0).unwrap().0.data()[0], 5.);
}

#[test]
fn test_knot_indexing() {
    let mut solver = custom_solver(SolverFlags::default());
    assert!(matches!(
        solver.set_input_cost(CostTerm::Diagonal(&[1., 1.]), &[0., 0.], Knot::Step(2)),
        Err(SolverError::IndexError { index: 2, bound: 2, .. })
    ));
    let k = Knot::from_index(-1).unwrap();
    solver.set_penalty(3.0, 0, k).unwrap();
    assert!(Knot::from_index(-3).is_err());
    assert_eq!(Knot::from_index(2).unwrap(), Knot::from(2usize));
}

#[test]
fn test_initial_state() {
    let mut solver = custom_solver(SolverFlags::default());
    assert_eq!(solver.get_initial_state(), &[0., 0.]);
    solver.set_initial_state(&[1., 2.]).unwrap();
    assert_eq!(solver.get_initial_state(), &[1., 2.]);
    assert!(matches!(
        solver.set_initial_state(&[1., 2., 3.]),
        Err(SolverError::DimensionError { .. })
    ));
}

#[test]
fn test_workspace_access() {
    let mut solver = custom_solver(SolverFlags::default());
    solver.set_state(&[1., 2., 3.], 1).unwrap();
    assert_eq!(solver.get_state(1).unwrap(), &[1., 2., 3.]);
    solver.set_input(&[4., 5.], 1).unwrap();
    assert_eq!(solver.get_input(1).unwrap(), &[4., 5.]);
    solver.set_dual(&[1., 0., 0.], 2, 1).unwrap();
    assert_eq!(solver.get_dual(2, 1).unwrap(), &[1., 0., 0.]);
    assert_eq!(solver.get_slack(2, 0).unwrap(), &[0.]);
    assert_eq!(solver.get_dynamics_dual(2).unwrap().len(), 3);

    assert!(matches!(
        solver.set_state(&[1., 2.], 1),
        Err(SolverError::DimensionError { .. })
    ));
    assert!(solver.set_input(&[1., 1.], 2).is_err());
    assert!(solver.get_dual(2, 2).is_err());
}

#[test]
fn test_mapping_changes() {
    let dims = [
        StageDims::new(1, 1, &[]),
        StageDims::new(1, 1, &[]),
    ];
    let mut solver = DefaultSolver::<f64>::new_with_custom_storage(
        &dims,
        &[0, 0, 0, 0],
        SolverFlags::default(),
        DefaultSettings::default(),
    )
    .unwrap();
    assert_eq!(solver.get_horizon_length(), 4);

    solver
        .set_state_cost(CostTerm::Dense(&[2.]), &[0.], Knot::All)
        .unwrap();
    solver.set_time_step_to_storage_mapping(&[0, 0, 1, 1], 4).unwrap();
    assert_eq!(solver.get_state_cost(3).unwrap().0.data(), &[0.]);
    assert_eq!(solver.get_state_cost(1).unwrap().0.data(), &[2.]);

    assert!(matches!(
        solver.set_time_step_to_storage_mapping(&[0, 2, 1, 1], 4),
        Err(SolverError::IndexError { index: 2, .. })
    ));
    assert!(matches!(
        solver.change_horizon_length(0),
        Err(SolverError::IndexError { .. })
    ));
}

#[test]
fn test_mapping_shortens_horizon() {
    let mut solver = DefaultSolver::<f64>::new(
        &[1, 1, 1, 1],
        &[1, 1, 1],
        &vec![Vec::new(); 4],
        SolverFlags::default(),
        DefaultSettings::default(),
    )
    .unwrap();
    solver
        .set_state_cost(CostTerm::Dense(&[1.]), &[0.], Knot::All)
        .unwrap();
    solver
        .set_input_cost(CostTerm::Dense(&[1.]), &[0.], Knot::All)
        .unwrap();
    solver
        .set_dynamics(&[-1.], &[-1.], None, None, &[0.], 1.0, Knot::All)
        .unwrap();

    // two steps: the first slot followed by the final one
    solver.set_time_step_to_storage_mapping(&[0, 3], 2).unwrap();
    assert_eq!(solver.get_horizon_length(), 2);
    assert!(solver.get_state(2).is_err());
    assert!(solver.get_input(1).is_err());

    solver.set_initial_state(&[1.]).unwrap();
    solver.solve();
    assert_eq!(solver.status(), SolverStatus::Solved);
    assert!((solver.get_input(0).unwrap()[0] + 0.5).abs() < 1e-6);
    assert!((solver.get_state(1).unwrap()[0] - 0.5).abs() < 1e-6);

    // and back to the full capacity
    solver
        .set_time_step_to_storage_mapping(&[0, 1, 2, 3], 4)
        .unwrap();
    assert_eq!(solver.get_horizon_length(), 4);
    assert!(matches!(
        solver.set_time_step_to_storage_mapping(&[0, 1], 3),
        Err(SolverError::DimensionError { .. })
    ));
}

#[test]
fn test_options() {
    let mut solver = custom_solver(SolverFlags::default());

    solver.set_option_float(SolverOption::TolPrimal, 1e-6).unwrap();
    assert_eq!(solver.get_option_float(SolverOption::TolPrimal).unwrap(), 1e-6);
    solver.set_option_int(SolverOption::Verbose, 1).unwrap();
    assert_eq!(solver.get_option_int(SolverOption::Verbose).unwrap(), 1);

    assert!(matches!(
        solver.set_option_float(SolverOption::Rho, -1.0),
        Err(SolverError::ConfigError(_))
    ));
    assert!(matches!(
        solver.set_option_int(SolverOption::Rho, 1),
        Err(SolverError::ConfigError(_))
    ));
    assert!(matches!(
        solver.get_option_float(SolverOption::MaxIter),
        Err(SolverError::ConfigError(_))
    ));
    let opt: SolverOption = "kkt_sigma".parse().unwrap();
    assert_eq!(opt, SolverOption::KktSigma);
}
