#![allow(non_snake_case)]

use cocoa::{io::ConfigurablePrintTarget, solver::*};

fn test_print_solver(verbose: bool) -> DefaultSolver<f64> {
    let settings = DefaultSettings {
        verbose,
        ..DefaultSettings::default()
    };
    let mut solver = DefaultSolver::new_lti(
        1,
        1,
        &[NegativeOrthantConeT(1)],
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

#[test]
fn test_print_to_stdout() {
    let mut solver = test_print_solver(true);
    solver.print_to_stdout();
    solver.solve();
}

#[test]
fn test_print_to_buffer() {
    let mut solver = test_print_solver(true);
    solver.print_to_buffer();
    solver.solve();
    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("cocoa"));
    assert!(result.contains("time steps    = 3"));
    assert!(result.contains("Terminated with status = Solved"));
}

#[test]
fn test_take_buffer_per_solve() {
    let mut solver = test_print_solver(true);
    solver.print_to_buffer();

    for _ in 0..2 {
        solver.solve();
        let result = solver.take_print_buffer().unwrap();
        assert_eq!(result.matches("Terminated with status").count(), 1);
        solver.shift_problem_with_copy().unwrap();
    }
    assert!(solver.get_print_buffer().unwrap().is_empty());
}

#[test]
fn test_quiet_by_default() {
    let mut solver = test_print_solver(false);
    solver.print_to_buffer();
    solver.solve();
    assert!(solver.get_print_buffer().unwrap().is_empty());

    // the summary is written regardless of verbosity
    solver.print_summary().unwrap();
    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("status        = Solved"));
    assert!(result.contains("iterations    = "));
    assert!(result.contains("total time    = "));
    assert!(result.contains("    kkt factor : "));
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver(true);
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("cocoa"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver(true);
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    solver.print_to_stream(stream);
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("cocoa"));
}
