//! Required traits for types providing an ADMM solver implementation.
//!
//! This module defines the core traits that must be implemented by a collection
//! of mutually associated data types to make a solver for a particular problem
//! format.
//!
//! In nearly all cases there is no need for a user to implement these traits.
//! Instead, users should use the collection of types that are provided
//! in the [Default solver implementation](crate::solver::implementations::default),
//! which collectively implement support for the optimal control problem
//! described in the top level crate documentation.

use super::{CoreSettings, KKTError, SettingsError, SolverStatus};
use crate::algebra::*;
use crate::timers::*;

/// Data for a constrained optimal control problem.

pub trait ProblemData<T: FloatT> {
    type V: Variables<T>;
    type SE: Settings<T>;

    /// Number of time steps in the active horizon.
    fn horizon(&self) -> usize;
}

/// Primal, dual and slack trajectories of the ADMM iteration.

pub trait Variables<T: FloatT> {
    type D: ProblemData<T>;
    type SE: Settings<T>;

    /// Keep a copy of the slacks and duals of the current iterate.
    fn save_prev(&mut self);

    /// Evaluate the constraint values along the primal trajectory and
    /// project the shifted values onto the constraint cones.
    fn project_slacks(&mut self, data: &Self::D, settings: &Self::SE);

    /// Scaled dual ascent step on the constraint duals.
    fn update_duals(&mut self, data: &Self::D, settings: &Self::SE);
}

/// Residuals for a constrained optimal control problem.

pub trait Residuals<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;

    /// Compute residuals for the given variables.
    fn update(&mut self, variables: &Self::V, data: &Self::D);
}

/// Linear system solved for the primal trajectory in every iteration.

pub trait KKTSystem<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type SE: Settings<T>;

    /// Refactor the KKT system if data or penalties changed since
    /// the last factorization.
    fn update(&mut self, data: &Self::D, settings: &Self::SE) -> Result<(), KKTError>;

    /// Solve for the primal trajectory and the equality duals, given
    /// the current slacks and constraint duals.
    fn solve(&mut self, variables: &mut Self::V, data: &Self::D, settings: &Self::SE);

    /// Force a refactorization at the next update.
    fn invalidate(&mut self);
}

/// Printing functions for the solver's Info

pub trait InfoPrint<T>
where
    T: FloatT,
{
    type D: ProblemData<T>;
    type SE: Settings<T>;

    /// Print the solver configuration, e.g. settings etc.
    /// This function is called once at the start of the solve.
    fn print_configuration(&mut self, settings: &Self::SE, data: &Self::D) -> std::io::Result<()>;

    /// Print a header to appear at the top of progress information.
    fn print_status_header(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver progress information.   Called once per iteration.
    fn print_status(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver final status and other exit information.   Called at
    /// solver termination.
    fn print_footer(&mut self, settings: &Self::SE) -> std::io::Result<()>;
}

/// Internal information for the solver to monitor progress and check for termination.

pub trait Info<T>: InfoPrint<T>
where
    T: FloatT,
{
    type V: Variables<T>;
    type R: Residuals<T>;

    /// Reset internal data, particularly solve timers.
    fn reset(&mut self, timers: &mut Timers);

    /// Compute final values before solver termination
    fn finalize(&mut self, timers: &mut Timers);

    /// Update solver progress information
    fn update(&mut self, data: &Self::D, residuals: &Self::R, iter: u32, timers: &Timers);

    /// Return `true` if termination conditions have been reached.
    fn check_termination(&mut self, residuals: &Self::R, settings: &Self::SE, iter: u32) -> bool;

    /// Report or update termination status
    fn get_status(&self) -> SolverStatus;
    fn set_status(&mut self, status: SolverStatus);
}

/// Settings for a constrained optimal control problem.
///
/// Implementors of this trait can define any internal or problem
/// specific settings they wish.   They must, however, also maintain
/// a settings object of type [`CoreSettings`](crate::solver::core::CoreSettings)
/// and return this to the solver internally.

pub trait Settings<T: FloatT> {
    /// Return the core settings.
    fn core(&self) -> &CoreSettings<T>;

    /// Return the core settings (mutably).
    fn core_mut(&mut self) -> &mut CoreSettings<T>;

    /// Checks that the settings are valid.
    fn validate(&self) -> Result<(), SettingsError>;
}
