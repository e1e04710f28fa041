//! __cocoa__ is an operator splitting (ADMM) solver for constrained optimal
//! control problems over a finite horizon of `N` time steps:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \sum_k \frac{1}{2}x_k^T Q_k x_k + q_k^T x_k + \frac{1}{2}u_k^T R_k u_k + r_k^T u_k + u_k^T H_k x_k\\\\\[2ex\]
//!  \text{subject to} & A_k x_k + B_k u_k + C_k x_{k+1} + D_k u_{k+1} + f_k = 0 \\\\\[1ex\]
//!         & G_{k,i} x_k + H_{k,i} u_k + h_{k,i} \in \mathcal{K}_{k,i} \\\\\[1ex\]
//!         & x_0 = \bar{x}_0
//!  \end{array}
//! $$
//!
//! where each $\mathcal{K}_{k,i}$ is a zero cone, a negative orthant or a
//! second-order cone.
//!
//! Each iteration solves the equality constrained subproblem with a
//! Riccati-style recursion over the time steps, projects the constraint
//! slacks onto their cones and updates the duals.  Problem data lives in
//! storage slots that any number of time steps may share, so time invariant
//! problems store a single copy of their data.
//!
//! ```
//! use cocoa::solver::*;
//!
//! // x' = x + u over three steps, minimizing ½Σx² + ½Σu² from x₀ = 1
//! let mut solver = DefaultSolver::<f64>::new_lti(
//!     1, 1, &[], 3,
//!     CostTerm::Diagonal(&[1.]), &[0.],
//!     CostTerm::Diagonal(&[1.]), &[0.],
//!     &[-1.], &[-1.], &[0.],
//!     DefaultSettings::default(),
//! ).unwrap();
//! solver.set_initial_state(&[1.]).unwrap();
//! solver.solve();
//! assert_eq!(solver.status(), SolverStatus::Solved);
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
