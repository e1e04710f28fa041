#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::{KKTSystem, ProblemData}, KKTError, SolverError};
use std::collections::TryReserveError;
use std::iter::zip;

// ---------------
// Riccati factorization of the per step KKT blocks.
//
// Step k minimizes ½wᵀP_k w + p_kᵀw subject to the entry constraint
// F_k w_k = c_k, where F_0 = [I 0], c_0 = x_init and, for k > 0,
// c_k = -(E_{k-1} w_{k-1} + f_{k-1}).  The entry constraint is handled
// with an augmented Lagrangian term of weight σ, so that only P̃_k and
// M_k = F_k P̃_k⁻¹ F_kᵀ need to be positive definite.
// ---------------

struct StepFactors<T> {
    // entry and exit dynamics
    F: Matrix<T>,
    E: Matrix<T>,
    // P̃ = P' + σFᵀF and M = F P̃⁻¹ Fᵀ
    chol_P: CholeskyEngine<T>,
    chol_M: CholeskyEngine<T>,
    // X = P̃⁻¹Fᵀ and S = M⁻¹ - σI
    X: Matrix<T>,
    S: Matrix<T>,
    // linear term p' of the cost-to-go and s = M⁻¹Xᵀp'
    p: Vec<T>,
    sv: Vec<T>,
}

impl<T> StepFactors<T>
where
    T: FloatT,
{
    fn try_new(max: &MaxDims) -> Result<Self, TryReserveError> {
        let (nx, nw) = (max.nx, max.nw);
        let mut p = Vec::new();
        p.try_reserve_exact(nw)?;
        let mut sv = Vec::new();
        sv.try_reserve_exact(nx)?;
        Ok(Self {
            F: Matrix::try_with_capacity(nx.saturating_mul(nw))?,
            E: Matrix::try_with_capacity(nx.saturating_mul(nw))?,
            chol_P: CholeskyEngine::try_with_capacity(nw)?,
            chol_M: CholeskyEngine::try_with_capacity(nx)?,
            X: Matrix::try_with_capacity(nw.saturating_mul(nx))?,
            S: Matrix::try_with_capacity(nx.saturating_mul(nx))?,
            p,
            sv,
        })
    }
}

/// Riccati based solver type implementing the [`KKTSystem`](crate::solver::core::traits::KKTSystem) trait

pub struct DefaultKKTSystem<T> {
    steps: Vec<StepFactors<T>>,

    // (rho, kkt_sigma, kkt_pivot_tol) of the current factorization
    factored: Option<(T, T, T)>,

    // matrix workspace
    P: Matrix<T>,
    M: Matrix<T>,
    SE: Matrix<T>,
    carry: Matrix<T>,

    // vector workspace
    carry_vec: Vec<T>,
    work_w: Vec<T>,
    work_x: Vec<T>,
    work_f: Vec<T>,
    work_c: Vec<T>,
    work_con: Vec<T>,
}

impl<T> DefaultKKTSystem<T>
where
    T: FloatT,
{
    pub(crate) fn try_new(data: &DefaultProblemData<T>) -> Result<Self, SolverError> {
        let max = &data.max;
        let capacity = data.mapper.capacity();

        let mut steps = Vec::new();
        steps.try_reserve_exact(capacity)?;
        for _ in 0..capacity {
            steps.push(StepFactors::try_new(max)?);
        }

        Ok(Self {
            steps,
            factored: None,
            P: Matrix::try_with_capacity(max.nw.saturating_mul(max.nw))?,
            M: Matrix::try_with_capacity(max.nx.saturating_mul(max.nx))?,
            SE: Matrix::try_with_capacity(max.nx.saturating_mul(max.nw))?,
            carry: Matrix::try_with_capacity(max.nw.saturating_mul(max.nw))?,
            carry_vec: try_zeros(max.nw)?,
            work_w: try_zeros(max.nw)?,
            work_x: try_zeros(max.nx)?,
            work_f: try_zeros(max.nx)?,
            work_c: try_zeros(max.nx)?,
            work_con: try_zeros(max.nrows)?,
        })
    }

    pub fn is_factored(&self) -> bool {
        self.factored.is_some()
    }

    fn assemble_dynamics(&mut self, data: &DefaultProblemData<T>) {
        let n = data.horizon();
        for (k, fac) in self.steps[..n].iter_mut().enumerate() {
            let nu = data.nu(k);
            if k == 0 {
                let nx = data.nx(0);
                fac.F.resize_zeroed((nx, nx + nu));
                for i in 0..nx {
                    fac.F[(i, i)] = T::one();
                }
            } else {
                data.stage(k - 1).assemble_entry(nu, &mut fac.F);
            }
            if k + 1 < n {
                data.stage(k).assemble_exit(nu, &mut fac.E);
            } else {
                fac.E.resize_zeroed((0, 0));
            }
        }
    }

    fn factor(
        &mut self,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<(), KKTError> {
        let n = data.horizon();
        let σ = settings.kkt_sigma;
        let tol = settings.kkt_pivot_tol;

        self.assemble_dynamics(data);

        for k in (0..n).rev() {
            let stage = data.stage(k);
            let nu = data.nu(k);
            let nw = data.nw(k);

            // P' = cost + penalty Hessians + cost-to-go of the next step
            let P = &mut self.P;
            P.resize_zeroed((nw, nw));
            stage.add_cost_hessian(nu, P);
            stage.add_constraint_hessian(nu, settings.rho, P);
            if k + 1 < n {
                P.add_block(0, 0, &self.carry, T::one());
            }

            let (head, tail) = self.steps.split_at_mut(k);
            let fac = &mut tail[0];

            P.mul(&fac.F.t(), &fac.F, σ, T::one());
            fac.chol_P
                .cholesky(P, tol)
                .map_err(|_| KKTError::SingularSystem(k))?;

            let nf = fac.F.nrows();
            fac.X.resize_zeroed((nw, nf));
            fac.X.set_block(0, 0, &fac.F.t());
            fac.chol_P.solve_columns(&mut fac.X);

            self.M.resize_zeroed((nf, nf));
            self.M.mul(&fac.F, &fac.X, T::one(), T::zero());
            fac.chol_M
                .cholesky(&self.M, tol)
                .map_err(|_| KKTError::SingularSystem(k))?;

            fac.chol_M.inverse_into(&mut fac.S);
            fac.S.add_diag(-σ);

            // cost-to-go passed back through the dynamics: EᵀSE
            if k > 0 {
                let E = &head[k - 1].E;
                let nwp = E.ncols();
                self.SE.resize_zeroed((nf, nwp));
                self.SE.mul(&fac.S, E, T::one(), T::zero());
                self.carry.resize_zeroed((nwp, nwp));
                self.carry.mul(&E.t(), &self.SE, T::one(), T::zero());
            }
        }
        Ok(())
    }
}

impl<T> KKTSystem<T> for DefaultKKTSystem<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type SE = DefaultSettings<T>;

    fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> Result<(), KKTError> {
        let current = (settings.rho, settings.kkt_sigma, settings.kkt_pivot_tol);
        if self.factored == Some(current) {
            return Ok(());
        }
        self.factored = None;
        self.factor(data, settings)?;
        self.factored = Some(current);
        Ok(())
    }

    fn solve(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) {
        let n = data.horizon();
        let σ = settings.kkt_sigma;

        // backward pass over the linear terms
        for k in (0..n).rev() {
            let stage = data.stage(k);
            let nu = data.nu(k);
            let nw = data.nw(k);
            let vars = &variables.steps[k];

            let (head, tail) = self.steps.split_at_mut(k);
            let fac = &mut tail[0];

            let p = &mut fac.p;
            p.clear();
            p.resize(nw, T::zero());
            stage.add_cost_gradient(nu, p);

            // v_i = ρ_i(h_i - z_i) + λ_i
            let v = &mut self.work_con[..stage.numel()];
            for (c, rng) in zip(&stage.constraints, &stage.cones.rng_cones) {
                let ρ = settings.rho * c.rho;
                let rng = rng.clone();
                let zi = &vars.z[rng.clone()];
                let λi = &vars.λ[rng.clone()];
                for (j, vj) in v[rng].iter_mut().enumerate() {
                    *vj = ρ * (c.h[j] - zi[j]) + λi[j];
                }
            }
            stage.add_constraint_t(nu, v, p, T::one());

            if k + 1 < n {
                p.axpby(T::one(), &self.carry_vec[..nw], T::one());
            }

            if k > 0 {
                let nf = fac.F.nrows();
                let sv = &mut fac.sv;
                sv.clear();
                sv.resize(nf, T::zero());
                fac.X.t().gemv(p, sv, T::one(), T::zero());
                fac.chol_M.solve(sv);

                // p'_{k-1} += Eᵀ(S f - s)
                let fe = &mut self.work_f[..nf];
                fe.set(T::zero());
                data.stage(k - 1).add_affine(fe, T::one());
                let tmp = &mut self.work_x[..nf];
                fac.S.gemv(fe, tmp, T::one(), T::zero());
                tmp.axpby(-T::one(), sv, T::one());

                let E = &head[k - 1].E;
                E.t()
                    .gemv(tmp, &mut self.carry_vec[..E.ncols()], T::one(), T::zero());
            }
        }

        // forward pass
        let c = &mut self.work_c;
        c[..data.x_init.len()].copy_from_slice(&data.x_init);

        for k in 0..n {
            let fac = &self.steps[k];
            let nw = data.nw(k);
            let nf = fac.F.nrows();
            let ck = &mut c[..nf];

            // t = P̃⁻¹(σFᵀc - p')
            let t = &mut self.work_w[..nw];
            t.copy_from(&fac.p);
            t.negate();
            fac.F.t().gemv(ck, t, σ, T::one());
            fac.chol_P.solve(t);

            // y = M⁻¹(Ft - c) and w = t - Xy
            let step = &mut variables.steps[k];
            fac.F.gemv(t, &mut step.y, T::one(), T::zero());
            step.y.axpby(-T::one(), ck, T::one());
            fac.chol_M.solve(&mut step.y);
            fac.X.gemv(&step.y, t, -T::one(), T::one());
            step.w.copy_from(t);

            if k + 1 < n {
                let cn = &mut c[..fac.E.nrows()];
                let stage = data.stage(k);
                stage.exit_mul(data.nu(k), &step.w, cn, -T::one(), T::zero());
                stage.add_affine(cn, -T::one());
            }
        }
    }

    fn invalidate(&mut self) {
        self.factored = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::{cones::SupportedConeT::*, traits::Variables};

    // x' = x + u with unit costs and x0 = 1
    fn scalar_problem(n: usize) -> DefaultProblemData<f64> {
        let dims = vec![StageDims::new(1, 1, &[]); n];
        let map: Vec<usize> = (0..n).collect();
        let mut data = DefaultProblemData::try_new(&dims, &map, n, SolverFlags::default()).unwrap();
        for st in data.stages.iter_mut() {
            st.Q = CostMatrix::Dense(Matrix::identity(1));
            st.R = CostMatrix::Dense(Matrix::identity(1));
            st.dynamics.A.copy_from_slice(&[-1.]);
            st.dynamics.B.copy_from_slice(&[-1.]);
        }
        data.x_init[0] = 1.0;
        data
    }

    #[test]
    fn test_two_step_lqr() {
        let data = scalar_problem(2);
        let settings = DefaultSettings::<f64>::default();
        let mut vars = DefaultVariables::try_new(&data).unwrap();
        let mut kkt = DefaultKKTSystem::try_new(&data).unwrap();

        assert!(!kkt.is_factored());
        kkt.update(&data, &settings).unwrap();
        assert!(kkt.is_factored());
        kkt.solve(&mut vars, &data, &settings);

        // min ½(1 + u²) + ½(1 + u)² gives u = -½
        let tol = 1e-10;
        assert!((vars.step(0).x()[0] - 1.0).abs() < tol);
        assert!((vars.step(0).u()[0] + 0.5).abs() < tol);
        assert!((vars.step(1).x()[0] - 0.5).abs() < tol);

        // stationarity of the Lagrangian
        assert!((vars.step(1).y[0] + 0.5).abs() < tol);
        assert!((vars.step(0).y[0] + 1.5).abs() < tol);
    }

    #[test]
    fn test_refactor_on_settings_change() {
        let data = scalar_problem(3);
        let mut settings = DefaultSettings::<f64>::default();
        let mut kkt = DefaultKKTSystem::try_new(&data).unwrap();
        kkt.update(&data, &settings).unwrap();
        assert_eq!(kkt.factored, Some((1.0, 1.0, 1e-13)));

        settings.kkt_sigma = 10.0;
        kkt.update(&data, &settings).unwrap();
        assert_eq!(kkt.factored, Some((1.0, 10.0, 1e-13)));

        kkt.invalidate();
        assert!(!kkt.is_factored());
    }

    #[test]
    fn test_penalty_terms() {
        // u ≥ -0.1 through -u - 0.1 ≤ 0
        let n = 2;
        let dims = vec![StageDims::new(1, 1, &[NegativeOrthantConeT(1)]); n];
        let mut data =
            DefaultProblemData::try_new(&dims, &[0, 1], n, SolverFlags::default()).unwrap();
        for st in data.stages.iter_mut() {
            st.Q = CostMatrix::Dense(Matrix::identity(1));
            st.R = CostMatrix::Dense(Matrix::identity(1));
            st.dynamics.A.copy_from_slice(&[-1.]);
            st.dynamics.B.copy_from_slice(&[-1.]);
            st.constraints[0].H.copy_from_slice(&[-1.]);
            st.constraints[0].h.copy_from_slice(&[-0.1]);
        }
        data.x_init[0] = 1.0;

        let settings = DefaultSettings::<f64>::default();
        let mut vars = DefaultVariables::try_new(&data).unwrap();
        let mut kkt = DefaultKKTSystem::try_new(&data).unwrap();
        kkt.update(&data, &settings).unwrap();

        // z = 0, λ = 0: the penalty ½(-u - 0.1)² joins the cost,
        // ½u² + ½(1 + u)² + ½(u + 0.1)² has its minimum at u = -1.1/3
        vars.save_prev();
        kkt.solve(&mut vars, &data, &settings);
        assert!((vars.step(0).u()[0] + 1.1 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_singular_system() {
        let mut data = scalar_problem(2);
        // no input cost and no input influence
        for st in data.stages.iter_mut() {
            st.R = CostMatrix::Dense(Matrix::zeros((1, 1)));
            st.dynamics.B.copy_from_slice(&[0.]);
        }
        let settings = DefaultSettings::<f64>::default();
        let mut kkt = DefaultKKTSystem::try_new(&data).unwrap();
        assert_eq!(
            kkt.update(&data, &settings),
            Err(KKTError::SingularSystem(0))
        );
        assert!(!kkt.is_factored());
    }
}
