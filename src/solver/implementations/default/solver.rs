use super::*;
use crate::solver::core::{
    cones::SupportedConeT,
    traits::{KKTSystem, ProblemData, Settings},
    Solver, SolverError, SolverStatus,
};

use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::*;
use log::debug;
use std::io::Write;

/// Solver for constrained optimal control problems

pub type DefaultSolver<T = f64> = Solver<
    DefaultProblemData<T>,
    DefaultVariables<T>,
    DefaultResiduals<T>,
    DefaultKKTSystem<T>,
    DefaultInfo<T>,
    DefaultSettings<T>,
>;

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Creates a solver over `num_states.len()` time steps, with one storage
    /// slot per step.
    ///
    /// `num_inputs` has one entry per step except the last, and
    /// `constraints` declares the cones of every step.
    pub fn new(
        num_states: &[usize],
        num_inputs: &[usize],
        constraints: &[Vec<SupportedConeT>],
        flags: SolverFlags,
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        let n = num_states.len();
        if n == 0 {
            return Err(SolverError::ConfigError(
                "the horizon needs at least one time step",
            ));
        }
        SolverError::check_len("input dimensions", n - 1, num_inputs.len())?;
        SolverError::check_len("constraint declarations", n, constraints.len())?;

        // the last slot takes the inputs of the step before it, so that
        // it remains usable as an interior step after a shift
        let nu = |k: usize| match k {
            k if k + 1 < n => num_inputs[k],
            _ if n >= 2 => num_inputs[n - 2],
            _ => 0,
        };

        let mut stage_dims = Vec::new();
        stage_dims.try_reserve_exact(n)?;
        for k in 0..n {
            let dims = StageDims::new(num_states[k], nu(k), &constraints[k]);
            let dims = if k + 1 < n {
                dims.with_next(num_states[k + 1], nu(k + 1))
            } else {
                dims
            };
            stage_dims.push(dims);
        }

        let mut map = Vec::new();
        map.try_reserve_exact(n)?;
        map.extend(0..n);

        Self::new_with_custom_storage(&stage_dims, &map, flags, settings)
    }

    /// Creates a solver from explicit storage slot declarations and a
    /// time step to storage slot mapping.  Slots may be shared by any
    /// number of time steps.
    pub fn new_with_custom_storage(
        stage_dims: &[StageDims],
        map: &[usize],
        flags: SolverFlags,
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;

        let mut timers = Timers::default();
        let mut output = Err(SolverError::MemoryError);

        timeit! {timers => "setup"; {
            output = Self::allocate(stage_dims, map, flags, settings);
        }}

        let mut output = output?;
        debug!(
            "solver setup: {} time steps over {} storage slots",
            output.data.horizon(),
            output.data.mapper.num_data()
        );

        //now that the timer is finished we can swap our
        //timer object into the solver structure
        output.timers.replace(timers);
        Ok(output)
    }

    fn allocate(
        stage_dims: &[StageDims],
        map: &[usize],
        flags: SolverFlags,
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        let capacity = usize::max(map.len(), stage_dims.len());
        let data = DefaultProblemData::<T>::try_new(stage_dims, map, capacity, flags)?;
        let variables = DefaultVariables::<T>::try_new(&data)?;
        let residuals = DefaultResiduals::<T>::try_new(&data)?;
        let kktsystem = DefaultKKTSystem::<T>::try_new(&data)?;
        let info = DefaultInfo::<T>::new();

        Ok(Self {
            data,
            variables,
            residuals,
            kktsystem,
            info,
            settings,
            timers: None,
        })
    }

    /// Creates a solver for a time invariant problem over `num_horizon`
    /// steps.  Every step shares one storage slot.
    #[allow(non_snake_case, clippy::too_many_arguments)]
    pub fn new_lti(
        num_states: usize,
        num_inputs: usize,
        constraints: &[SupportedConeT],
        num_horizon: usize,
        Q: CostTerm<T>,
        q: &[T],
        R: CostTerm<T>,
        r: &[T],
        A: &[T],
        B: &[T],
        f: &[T],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        let diagonal_costs = matches!(
            (&Q, &R),
            (CostTerm::Diagonal(_), CostTerm::Diagonal(_))
        );
        let flags = SolverFlags {
            diagonal_costs,
            block_diagonal: true,
            explicit_integration: false,
        };

        let stage_dims = [StageDims::new(num_states, num_inputs, constraints)];
        let mut map = Vec::new();
        map.try_reserve_exact(num_horizon)?;
        map.resize(num_horizon, 0);

        let mut solver = Self::new_with_custom_storage(&stage_dims, &map, flags, settings)?;
        solver.set_state_cost(Q, q, Knot::All)?;
        solver.set_input_cost(R, r, Knot::All)?;
        solver.set_dynamics(A, B, None, None, f, T::one(), Knot::All)?;
        Ok(solver)
    }

    // ---------------------------------
    // solve control
    // ---------------------------------

    /// Clears every primal, dual and slack iterate
    pub fn reset(&mut self) {
        self.variables.reset();
    }

    /// Clears the constraint and dynamics duals
    pub fn reset_duals(&mut self) {
        self.variables.reset_duals();
    }

    /// Sets the relative penalty weight of every constraint back to one
    pub fn reset_penalties(&mut self) {
        for st in self.data.stages.iter_mut() {
            st.constraints.iter_mut().for_each(|c| c.rho = T::one());
        }
        self.kktsystem.invalidate();
    }

    // ---------------------------------
    // diagnostics
    // ---------------------------------

    pub fn status(&self) -> SolverStatus {
        self.info.status
    }

    pub fn primal_feasibility(&self) -> T {
        self.info.res_primal
    }

    pub fn dual_feasibility(&self) -> T {
        self.info.res_dual
    }

    pub fn stationarity(&self) -> T {
        self.info.res_stationarity
    }

    pub fn complementarity(&self) -> T {
        self.info.res_complementarity
    }

    pub fn iterations(&self) -> u32 {
        self.info.iterations
    }

    /// Duration of the most recent solve in seconds
    pub fn solve_time(&self) -> f64 {
        self.info.solve_time
    }

    /// Floating point precision of the solver instance
    pub fn precision(&self) -> Precision {
        Precision::of::<T>()
    }

    /// Writes the status and residuals of the last solve, followed by the
    /// timer tree, to the current print target
    pub fn print_summary(&mut self) -> std::io::Result<()> {
        self.info.print_summary()?;
        if let Some(timers) = &self.timers {
            let out = self.info.print_target();
            writeln!(out, "total time    = {:?}", timers.total_time())?;
            timers.print(out)?;
            out.flush()?;
        }
        Ok(())
    }

    // ---------------------------------
    // workspace access
    // ---------------------------------

    fn check_step(&self, k: usize, bound: usize) -> Result<(), SolverError> {
        if k >= bound {
            return Err(SolverError::index("time step", k, bound));
        }
        Ok(())
    }

    fn num_input_steps(&self) -> usize {
        self.data.horizon() - 1
    }

    // index range of constraint `i` in the stacked vectors of step `k`
    fn constraint_range(&self, k: usize, i: usize) -> Result<std::ops::Range<usize>, SolverError> {
        self.check_step(k, self.data.horizon())?;
        let rngs = &self.data.stage(k).cones.rng_cones;
        rngs.get(i)
            .cloned()
            .ok_or(SolverError::index("constraint", i, rngs.len()))
    }

    pub fn get_state(&self, k: usize) -> Result<&[T], SolverError> {
        self.check_step(k, self.data.horizon())?;
        Ok(self.variables.steps[k].x())
    }

    pub fn set_state(&mut self, x: &[T], k: usize) -> Result<(), SolverError> {
        self.check_step(k, self.data.horizon())?;
        let step = &mut self.variables.steps[k];
        SolverError::check_len("state", step.x().len(), x.len())?;
        step.x_mut().copy_from(x);
        Ok(())
    }

    pub fn get_input(&self, k: usize) -> Result<&[T], SolverError> {
        self.check_step(k, self.num_input_steps())?;
        Ok(self.variables.steps[k].u())
    }

    pub fn set_input(&mut self, u: &[T], k: usize) -> Result<(), SolverError> {
        self.check_step(k, self.num_input_steps())?;
        let step = &mut self.variables.steps[k];
        SolverError::check_len("input", step.u().len(), u.len())?;
        step.u_mut().copy_from(u);
        Ok(())
    }

    /// Dual of constraint `i` at step `k`
    pub fn get_dual(&self, k: usize, i: usize) -> Result<&[T], SolverError> {
        let rng = self.constraint_range(k, i)?;
        Ok(&self.variables.steps[k].λ[rng])
    }

    pub fn set_dual(&mut self, λ: &[T], k: usize, i: usize) -> Result<(), SolverError> {
        let rng = self.constraint_range(k, i)?;
        SolverError::check_len("constraint dual", rng.len(), λ.len())?;
        self.variables.steps[k].λ[rng].copy_from(λ);
        Ok(())
    }

    /// Projected slack of constraint `i` at step `k`
    pub fn get_slack(&self, k: usize, i: usize) -> Result<&[T], SolverError> {
        let rng = self.constraint_range(k, i)?;
        Ok(&self.variables.steps[k].z[rng])
    }

    /// Dual of the equality entering step `k`: the initial state
    /// for `k = 0`, the dynamics from step `k - 1` otherwise
    pub fn get_dynamics_dual(&self, k: usize) -> Result<&[T], SolverError> {
        self.check_step(k, self.data.horizon())?;
        Ok(&self.variables.steps[k].y)
    }

    // ---------------------------------
    // horizon and storage mapping
    // ---------------------------------

    pub fn get_horizon_length(&self) -> usize {
        self.data.horizon()
    }

    pub fn uses_diagonal_costs(&self) -> bool {
        self.data.flags.diagonal_costs
    }

    pub fn is_block_diagonal(&self) -> bool {
        self.data.flags.block_diagonal
    }

    pub fn uses_explicit_integration(&self) -> bool {
        self.data.flags.explicit_integration
    }

    /// Resizes the active horizon within the capacity fixed at construction
    pub fn change_horizon_length(&mut self, horizon: usize) -> Result<(), SolverError> {
        let window = self.data.mapper.window_with_length(horizon)?;
        check_chain(&self.data.stages, window)?;

        self.data.mapper.change_horizon_length(horizon)?;
        self.window_changed();
        debug!("horizon length changed to {horizon}");
        Ok(())
    }

    /// Replaces the active window by `map`, one storage slot per time step.
    /// The horizon becomes `horizon`, which must equal `map.len()` and lie
    /// within the capacity fixed at construction.
    pub fn set_time_step_to_storage_mapping(
        &mut self,
        map: &[usize],
        horizon: usize,
    ) -> Result<(), SolverError> {
        self.data.mapper.check_horizon_length(horizon)?;
        self.data.mapper.check_mapping(map, horizon)?;
        check_chain(&self.data.stages, map)?;

        self.data.mapper.set_mapping(map, horizon)?;
        self.window_changed();
        debug!("time step to storage mapping replaced, horizon length {horizon}");
        Ok(())
    }

    pub(crate) fn window_changed(&mut self) {
        self.data.conform_initial_state();
        self.variables.conform(&self.data);
        self.kktsystem.invalidate();
    }

    // ---------------------------------
    // options
    // ---------------------------------

    pub fn set_option_float(&mut self, option: SolverOption, value: T) -> Result<(), SolverError> {
        self.settings.set_option_float(option, value)?;
        Ok(())
    }

    pub fn set_option_int(&mut self, option: SolverOption, value: i64) -> Result<(), SolverError> {
        self.settings.set_option_int(option, value)?;
        Ok(())
    }

    pub fn get_option_float(&self, option: SolverOption) -> Result<T, SolverError> {
        Ok(self.settings.get_option_float(option)?)
    }

    pub fn get_option_int(&self, option: SolverOption) -> Result<i64, SolverError> {
        Ok(self.settings.get_option_int(option)?)
    }
}
