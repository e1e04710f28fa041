use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::Cone,
    traits::{ProblemData, Variables},
    SolverError,
};
use itertools::izip;
use std::collections::TryReserveError;
use std::iter::zip;

// ---------------
// Variables type for the default problem format
// ---------------

/// Iterates of a single time step.
///
/// `w = (x, u)` is stored contiguously.  `y` is the dual of the equality
/// entering the step, i.e. the initial state pin for step 0 and the dynamics
/// from the previous step otherwise.  `s`, `z` and `λ` stack the constraint
/// values, slacks and duals of every constraint of the step.
#[derive(Debug, Clone)]
pub struct StepVariables<T> {
    pub(crate) nx: usize,
    pub(crate) w: Vec<T>,
    pub(crate) y: Vec<T>,
    pub(crate) s: Vec<T>,
    pub(crate) z: Vec<T>,
    pub(crate) λ: Vec<T>,
    pub(crate) z_prev: Vec<T>,
    pub(crate) λ_prev: Vec<T>,
    pub(crate) y_prev: Vec<T>,
}

fn try_buffer<T>(capacity: usize) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    Ok(v)
}

impl<T> StepVariables<T>
where
    T: FloatT,
{
    fn try_new(max: &MaxDims) -> Result<Self, TryReserveError> {
        Ok(Self {
            nx: 0,
            w: try_buffer(max.nw)?,
            y: try_buffer(max.nx)?,
            s: try_buffer(max.nrows)?,
            z: try_buffer(max.nrows)?,
            λ: try_buffer(max.nrows)?,
            z_prev: try_buffer(max.nrows)?,
            λ_prev: try_buffer(max.nrows)?,
            y_prev: try_buffer(max.nx)?,
        })
    }

    pub fn x(&self) -> &[T] {
        &self.w[..self.nx]
    }

    pub fn u(&self) -> &[T] {
        &self.w[self.nx..]
    }

    pub(crate) fn u_mut(&mut self) -> &mut [T] {
        &mut self.w[self.nx..]
    }

    pub(crate) fn x_mut(&mut self) -> &mut [T] {
        &mut self.w[..self.nx]
    }

    // resizes within capacity.  States survive when their count is
    // unchanged, inputs are truncated or padded with zeros.
    fn conform(&mut self, nx: usize, nu: usize, nrows: usize) {
        if self.nx != nx {
            self.w.clear();
            self.y.clear();
            self.y_prev.clear();
            self.nx = nx;
        }
        self.w.resize(nx + nu, T::zero());
        self.y.resize(nx, T::zero());
        self.y_prev.resize(nx, T::zero());
        for v in [
            &mut self.s,
            &mut self.z,
            &mut self.λ,
            &mut self.z_prev,
            &mut self.λ_prev,
        ] {
            v.resize(nrows, T::zero());
        }
    }

    fn zero(&mut self) {
        for v in self.buffers_mut() {
            v.set(T::zero());
        }
    }

    fn zero_duals(&mut self) {
        self.y.set(T::zero());
        self.y_prev.set(T::zero());
        self.λ.set(T::zero());
        self.λ_prev.set(T::zero());
    }

    // takes the sizes of `src`
    fn copy_from(&mut self, src: &Self) {
        self.nx = src.nx;
        for (to, from) in zip(self.buffers_mut(), src.buffers()) {
            to.clear();
            to.extend_from_slice(from);
        }
    }

    fn buffers(&self) -> [&Vec<T>; 8] {
        [
            &self.w,
            &self.y,
            &self.s,
            &self.z,
            &self.λ,
            &self.z_prev,
            &self.λ_prev,
            &self.y_prev,
        ]
    }

    fn buffers_mut(&mut self) -> [&mut Vec<T>; 8] {
        [
            &mut self.w,
            &mut self.y,
            &mut self.s,
            &mut self.z,
            &mut self.λ,
            &mut self.z_prev,
            &mut self.λ_prev,
            &mut self.y_prev,
        ]
    }
}

/// Standard variables type implementing the [`Variables`](crate::solver::core::traits::Variables) trait
#[derive(Debug, Clone)]
pub struct DefaultVariables<T> {
    // one entry per time step of the largest admissible horizon
    pub(crate) steps: Vec<StepVariables<T>>,
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    pub(crate) fn try_new(data: &DefaultProblemData<T>) -> Result<Self, SolverError> {
        let capacity = data.mapper.capacity();
        let mut steps = Vec::new();
        steps.try_reserve_exact(capacity)?;
        for _ in 0..capacity {
            steps.push(StepVariables::try_new(&data.max)?);
        }
        let mut vars = Self { steps };
        vars.conform(data);
        Ok(vars)
    }

    /// Matches every step of the horizon to the dimensions of its storage slot
    pub(crate) fn conform(&mut self, data: &DefaultProblemData<T>) {
        for (k, step) in self.steps[..data.horizon()].iter_mut().enumerate() {
            step.conform(data.nx(k), data.nu(k), data.numel(k));
        }
    }

    pub(crate) fn reset(&mut self) {
        self.steps.iter_mut().for_each(|s| s.zero());
    }

    pub(crate) fn reset_duals(&mut self) {
        self.steps.iter_mut().for_each(|s| s.zero_duals());
    }

    /// Moves every step of an `n` step horizon down by one.  The new last step
    /// is zeroed, or copied from the former last step.
    pub(crate) fn shift(&mut self, n: usize, copy: bool) {
        let steps = &mut self.steps[..n];
        steps.rotate_left(1);
        if n < 2 {
            if !copy {
                steps[0].zero();
            }
            return;
        }
        let (head, tail) = steps.split_at_mut(n - 1);
        if copy {
            tail[0].copy_from(&head[n - 2]);
        } else {
            tail[0].zero();
        }
    }

    /// After `conform`, gives the new second to last step the inputs of the
    /// step before it, when the sizes agree
    pub(crate) fn copy_trailing_input(&mut self, n: usize) {
        if n < 3 {
            return;
        }
        let (head, tail) = self.steps.split_at_mut(n - 2);
        let (src, dst) = (&head[n - 3], &mut tail[0]);
        if src.u().len() == dst.u().len() {
            dst.u_mut().copy_from(src.u());
        }
    }

    pub fn step(&self, k: usize) -> &StepVariables<T> {
        &self.steps[k]
    }
}

impl<T> Variables<T> for DefaultVariables<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type SE = DefaultSettings<T>;

    fn save_prev(&mut self) {
        for step in self.steps.iter_mut() {
            step.z_prev.copy_from(&step.z);
            step.λ_prev.copy_from(&step.λ);
            step.y_prev.copy_from(&step.y);
        }
    }

    fn project_slacks(&mut self, data: &DefaultProblemData<T>, settings: &DefaultSettings<T>) {
        let n = data.horizon();
        for (k, step) in self.steps[..n].iter_mut().enumerate() {
            let stage = data.stage(k);
            stage.constraint_values(data.nu(k), &step.w, &mut step.s);

            // z = Π(s + λ/ρ)
            for (c, rng) in zip(&stage.constraints, &stage.cones.rng_cones) {
                let ρinv = T::recip(settings.rho * c.rho);
                let rng = rng.clone();
                step.z[rng.clone()].waxpby(T::one(), &step.s[rng.clone()], ρinv, &step.λ[rng]);
            }
            stage.cones.project(&mut step.z);

            let tol = T::epsilon().sqrt() * (T::one() + step.z.norm_inf());
            debug_assert!(!tol.is_finite() || stage.cones.contains(&step.z, tol));
        }
    }

    fn update_duals(&mut self, data: &DefaultProblemData<T>, settings: &DefaultSettings<T>) {
        let n = data.horizon();
        for (k, step) in self.steps[..n].iter_mut().enumerate() {
            let stage = data.stage(k);
            for (c, rng) in zip(&stage.constraints, &stage.cones.rng_cones) {
                let ρ = settings.rho * c.rho;
                let (s, z) = (&step.s[rng.clone()], &step.z[rng.clone()]);
                for (λ, &s, &z) in izip!(&mut step.λ[rng.clone()], s, z) {
                    *λ += ρ * (s - z);
                }
            }
        }
    }
}
