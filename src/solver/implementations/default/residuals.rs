#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{cones::Cone, traits::{ProblemData, Residuals}, SolverError};
use itertools::izip;
use std::iter::zip;

// ---------------
// Residuals type for default problem format
// ---------------

/// Standard residuals type implementing the [`Residuals`](crate::solver::core::traits::Residuals) trait

#[derive(Debug, Clone)]
pub struct DefaultResiduals<T> {
    // convergence measures
    pub primal: T,
    pub dual: T,
    pub stationarity: T,
    pub complementarity: T,

    // measures for the infeasibility certificate, formed from
    // the change δλ, δy of the duals over the last iteration
    pub delta_dual: T,
    pub delta_stationarity: T,
    pub delta_polar: T,
    pub delta_support: T,

    // work vectors
    grad: Vec<T>,
    eq: Vec<T>,
    δλ: Vec<T>,
    δy: Vec<T>,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub(crate) fn try_new(data: &DefaultProblemData<T>) -> Result<Self, SolverError> {
        let max = &data.max;
        Ok(Self {
            primal: T::zero(),
            dual: T::zero(),
            stationarity: T::zero(),
            complementarity: T::zero(),
            delta_dual: T::zero(),
            delta_stationarity: T::zero(),
            delta_polar: T::zero(),
            delta_support: T::zero(),
            grad: try_zeros(max.nw)?,
            eq: try_zeros(max.nx)?,
            δλ: try_zeros(max.nrows)?,
            δy: try_zeros(max.nx)?,
        })
    }

    fn reset(&mut self) {
        for v in [
            &mut self.primal,
            &mut self.dual,
            &mut self.stationarity,
            &mut self.complementarity,
            &mut self.delta_dual,
            &mut self.delta_stationarity,
            &mut self.delta_polar,
            &mut self.delta_support,
        ] {
            *v = T::zero();
        }
    }

    /// `true` if the dual change over the last iteration certifies
    /// that the constraints cannot be satisfied
    pub fn is_infeasible(&self, tol_primal: T, tol_infeas: T) -> bool {
        let scale = tol_infeas * self.delta_dual;
        self.primal > tol_primal
            && self.delta_dual > T::zero()
            && self.delta_stationarity <= scale
            && self.delta_polar <= scale
            && self.delta_support > scale
    }
}

// `out = Σ J_iᵀ v_i + F_kᵀ a + E_kᵀ b` for the dual vectors `a`
// of step k and `b` of step k + 1
fn dual_sum<T: FloatT>(
    data: &DefaultProblemData<T>,
    k: usize,
    v: &[T],
    a: &[T],
    b: Option<&[T]>,
    out: &mut [T],
) {
    let stage = data.stage(k);
    let nu = data.nu(k);
    stage.add_constraint_t(nu, v, out, T::one());
    if k == 0 {
        out[..a.len()].axpby(T::one(), a, T::one());
    } else {
        data.stage(k - 1).entry_mul_t(nu, a, out, T::one(), T::one());
    }
    if let Some(b) = b {
        stage.exit_mul_t(nu, b, out, T::one(), T::one());
    }
}

impl<T> Residuals<T> for DefaultResiduals<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;

    fn update(&mut self, variables: &DefaultVariables<T>, data: &DefaultProblemData<T>) {
        self.reset();
        let n = data.horizon();

        for k in 0..n {
            let stage = data.stage(k);
            let nu = data.nu(k);
            let nw = data.nw(k);
            let step = &variables.steps[k];
            let next = (k + 1 < n).then(|| &variables.steps[k + 1]);

            // conic constraints
            for (cone, rng) in zip(stage.cones.iter(), &stage.cones.rng_cones) {
                let (s, z, λ) = (&step.s[rng.clone()], &step.z[rng.clone()], &step.λ[rng.clone()]);
                self.primal = T::max(self.primal, s.norm_inf_diff(z));
                self.dual = T::max(self.dual, cone.polar_distance(λ));
                let mut gap = T::zero();
                for (&λi, &si, &zi) in izip!(λ, s, z) {
                    gap += λi * (si - zi);
                }
                self.complementarity = T::max(self.complementarity, gap.abs());
            }

            // equality entering the step
            let nx = step.x().len();
            let eq = &mut self.eq[..nx];
            if k == 0 {
                eq.waxpby(T::one(), step.x(), -T::one(), &data.x_init);
            } else {
                let prev = data.stage(k - 1);
                let pstep = &variables.steps[k - 1];
                prev.entry_mul(nu, &step.w, eq, T::one(), T::zero());
                prev.exit_mul(data.nu(k - 1), &pstep.w, eq, T::one(), T::one());
                prev.add_affine(eq, T::one());
            }
            self.primal = T::max(self.primal, eq.norm_inf());

            // stationarity of the Lagrangian in w_k
            let g = &mut self.grad[..nw];
            g.set(T::zero());
            stage.mul_cost_hessian(nu, &step.w, g);
            stage.add_cost_gradient(nu, g);
            dual_sum(data, k, &step.λ, &step.y, next.map(|s| &s.y[..]), g);
            self.stationarity = T::max(self.stationarity, g.norm_inf());

            // dual changes
            let δλ = &mut self.δλ[..step.λ.len()];
            δλ.waxpby(T::one(), &step.λ, -T::one(), &step.λ_prev);
            let δy = &mut self.δy[..nx];
            δy.waxpby(T::one(), &step.y, -T::one(), &step.y_prev);
            self.delta_dual = T::max(self.delta_dual, T::max(δλ.norm_inf(), δy.norm_inf()));
            self.delta_polar = T::max(self.delta_polar, stage.cones.polar_distance(δλ));

            self.delta_support += stage.dot_constraint_offsets(δλ);
            if k == 0 {
                self.delta_support -= δy.dot(&data.x_init);
            }

            // Σ Jᵀδλ + F_kᵀδy_k + E_kᵀδy_{k+1}, reusing the gradient buffer
            let g = &mut self.grad[..nw];
            g.set(T::zero());
            match next {
                Some(ns) => {
                    let δy_next = &mut self.eq[..ns.y.len()];
                    δy_next.waxpby(T::one(), &ns.y, -T::one(), &ns.y_prev);
                    self.delta_support += stage.dot_affine(δy_next);
                    dual_sum(data, k, δλ, δy, Some(&*δy_next), g);
                }
                None => dual_sum(data, k, δλ, δy, None, g),
            }
            self.delta_stationarity = T::max(self.delta_stationarity, g.norm_inf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    #[test]
    fn test_certificate_tests() {
        let data = {
            let dims = vec![StageDims::new(1, 0, &[ZeroConeT(1)])];
            DefaultProblemData::<f64>::try_new(&dims, &[0], 1, SolverFlags::default()).unwrap()
        };
        let mut r = DefaultResiduals::try_new(&data).unwrap();
        r.primal = 1.0;
        r.delta_dual = 1.0;
        r.delta_support = 0.5;
        assert!(r.is_infeasible(1e-4, 1e-4));

        r.delta_stationarity = 0.1;
        assert!(!r.is_infeasible(1e-4, 1e-4));

        r.delta_stationarity = 0.0;
        r.primal = 0.0;
        assert!(!r.is_infeasible(1e-4, 1e-4));
    }

    #[test]
    fn test_residuals_at_optimum() {
        // min ½x₀² + ½u² + ½x₁², x₁ = x₀ + u, x₀ = 1, u ≤ 0.  The optimum is
        // u = -½ with inactive constraint and duals y₀ = -1.5, y₁ = -0.5
        let dims = vec![StageDims::new(1, 1, &[NegativeOrthantConeT(1)]); 2];
        let mut data =
            DefaultProblemData::<f64>::try_new(&dims, &[0, 1], 2, SolverFlags::default()).unwrap();
        for st in data.stages.iter_mut() {
            st.Q = CostMatrix::Dense(Matrix::identity(1));
            st.R = CostMatrix::Dense(Matrix::identity(1));
            st.dynamics.A.copy_from_slice(&[-1.]);
            st.dynamics.B.copy_from_slice(&[-1.]);
            st.constraints[0].H.copy_from_slice(&[1.]);
        }
        data.x_init[0] = 1.0;

        let mut vars = DefaultVariables::try_new(&data).unwrap();
        vars.steps[0].w.copy_from_slice(&[1., -0.5]);
        vars.steps[1].w.copy_from_slice(&[0.5]);
        vars.steps[0].y[0] = -1.5;
        vars.steps[1].y[0] = -0.5;
        vars.steps[0].s[0] = -0.5;
        vars.steps[0].z[0] = -0.5;

        let mut r = DefaultResiduals::try_new(&data).unwrap();
        r.update(&vars, &data);
        assert!(r.primal < 1e-14);
        assert!(r.dual < 1e-14);
        assert!(r.stationarity < 1e-14);
        assert!(r.complementarity < 1e-14);

        // a negative dual violates the polar cone, a mismatch of the
        // dynamics shows up in the primal residual
        vars.steps[0].λ[0] = -0.25;
        vars.steps[1].w[0] = 0.75;
        r.update(&vars, &data);
        assert!((r.dual - 0.25).abs() < 1e-14);
        assert!((r.primal - 0.25).abs() < 1e-14);
        assert!((r.delta_dual - 1.5).abs() < 1e-14);
    }
}
