//! cocoa solver main module.
//!
//! This module contains the main types and traits for the solver.
//!
//! The solver comes with a [default implementation](crate::solver::implementations::default)
//! of all required traits, solving problems over dense per-step data with
//! a Riccati factorization of the KKT system.
//!
//! It is also possible to implement a custom solver by defining a collection
//! of custom types that together implement all of the required core
//! [traits](crate::solver::core::traits) for
//! objects in the core solver loop.

// internal module structure
pub(crate) mod core;
pub mod implementations;

//allows declaration of cone constraints
pub use crate::solver::core::cones::{SupportedConeT, SupportedConeT::*};

//user facing traits required to interact with solver
pub use crate::solver::core::{ADMMSolver, KKTError, SolverError, SolverStatus};

//storage slot indirection between time steps and problem data
pub use crate::solver::core::storage::StorageMapper;

//user facing traits required to define new implementations
pub use crate::solver::core::traits;
pub use crate::solver::core::CoreSettings;

pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
