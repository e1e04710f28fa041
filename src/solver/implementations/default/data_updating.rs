#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::SupportedConeT,
    traits::{KKTSystem, ProblemData},
    SolverError,
};
use log::trace;

// Index range of the time steps a setter may address: the states and
// constraints of every step, the inputs and dynamics of every step but the last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    State,
    Input,
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    fn bound(&self, target: Target) -> usize {
        let n = self.data.horizon();
        match target {
            Target::State => n,
            Target::Input => n - 1,
        }
    }

    fn check_slots(
        &self,
        knot: Knot,
        target: Target,
        check: impl Fn(&StageData<T>) -> Result<(), SolverError>,
    ) -> Result<(), SolverError> {
        let bound = self.bound(target);
        for s in target_slots(&self.data.mapper, knot, bound)? {
            check(&self.data.stages[s])?;
        }
        Ok(())
    }

    // callers run `check_slots` with the same knot and target first
    fn write_slots(
        &mut self,
        knot: Knot,
        target: Target,
        mut write: impl FnMut(&mut StageData<T>),
    ) -> Result<(), SolverError> {
        let bound = self.bound(target);
        for s in target_slots(&self.data.mapper, knot, bound)? {
            trace!("updating storage slot {s}");
            write(&mut self.data.stages[s]);
        }
        self.kktsystem.invalidate();
        Ok(())
    }

    /// Validates every addressed slot, then writes them all
    fn update_slots(
        &mut self,
        knot: Knot,
        target: Target,
        check: impl Fn(&StageData<T>) -> Result<(), SolverError>,
        write: impl FnMut(&mut StageData<T>),
    ) -> Result<(), SolverError> {
        self.check_slots(knot, target, check)?;
        self.write_slots(knot, target, write)
    }

    fn stage_at(&self, k: usize, target: Target) -> Result<&StageData<T>, SolverError> {
        let bound = self.bound(target);
        if k >= bound {
            return Err(SolverError::index("time step", k, bound));
        }
        Ok(self.data.stage(k))
    }

    // ---------------------------------
    // setters
    // ---------------------------------

    /// Sets the state cost `½xᵀQx + qᵀx` of step `k`, or of every step
    /// with [`Knot::All`]
    pub fn set_state_cost(&mut self, Q: CostTerm<T>, q: &[T], k: Knot) -> Result<(), SolverError> {
        self.update_slots(
            k,
            Target::State,
            |st| {
                st.Q.check(&Q, "state cost Q")?;
                SolverError::check_len("state cost q", st.nx(), q.len())
            },
            |st| {
                st.Q.assign(&Q);
                st.q.copy_from(q);
            },
        )
    }

    /// Sets the input cost `½uᵀRu + rᵀu` of step `k`
    pub fn set_input_cost(&mut self, R: CostTerm<T>, r: &[T], k: Knot) -> Result<(), SolverError> {
        self.update_slots(
            k,
            Target::Input,
            |st| {
                st.R.check(&R, "input cost R")?;
                SolverError::check_len("input cost r", st.dims.num_inputs, r.len())
            },
            |st| {
                st.R.assign(&R);
                st.r.copy_from(r);
            },
        )
    }

    /// Sets the cross term `uᵀHx` of step `k`.  `H` is column major.
    pub fn set_cross_term_cost(&mut self, H: &[T], k: Knot) -> Result<(), SolverError> {
        if self.data.flags.block_diagonal {
            return Err(SolverError::ConfigError(
                "cross terms are not stored with block diagonal costs",
            ));
        }
        self.update_slots(
            k,
            Target::Input,
            |st| SolverError::check_len("cross term H", st.Hux.data().len(), H.len()),
            |st| {
                st.Hux.copy_from_slice(H);
            },
        )
    }

    /// Sets the dynamics `A x + B u + C x' + D u' + f = 0` from step `k`
    /// into step `k + 1`.  `C` defaults to the identity and `D` to zero.
    ///
    /// With explicit integration the dynamics read `x' = x + h (A x + B u + f)`
    /// and neither `C` nor `D` may be given.
    #[allow(clippy::too_many_arguments)]
    pub fn set_dynamics(
        &mut self,
        A: &[T],
        B: &[T],
        C: Option<&[T]>,
        D: Option<&[T]>,
        f: &[T],
        h: T,
        k: Knot,
    ) -> Result<(), SolverError> {
        if self.data.flags.explicit_integration && (C.is_some() || D.is_some()) {
            return Err(SolverError::ConfigError(
                "C and D are not used with explicit integration",
            ));
        }
        if !(h > T::zero() && h.is_finite()) {
            return Err(SolverError::ConfigError("time steps must be positive"));
        }

        self.update_slots(
            k,
            Target::Input,
            |st| {
                let d = &st.dims;
                let nxn = d.num_next_states;
                SolverError::check_len("dynamics A", nxn * d.num_states, A.len())?;
                SolverError::check_len("dynamics B", nxn * d.num_inputs, B.len())?;
                if let Some(C) = C {
                    SolverError::check_len("dynamics C", nxn * nxn, C.len())?;
                }
                if let Some(D) = D {
                    SolverError::check_len("dynamics D", nxn * d.num_next_inputs, D.len())?;
                }
                SolverError::check_len("dynamics f", nxn, f.len())
            },
            |st| {
                let dyn_ = &mut st.dynamics;
                dyn_.A.copy_from_slice(A);
                dyn_.B.copy_from_slice(B);
                match C {
                    Some(C) => {
                        dyn_.C.copy_from_slice(C);
                    }
                    None => dyn_.C.set_identity(),
                }
                match D {
                    Some(D) => {
                        dyn_.D.copy_from_slice(D);
                    }
                    None => {
                        dyn_.D.data_mut().set(T::zero());
                    }
                }
                dyn_.f.copy_from(f);
                dyn_.h = h;
            },
        )
    }

    /// Sets the coefficients of constraint `i` of step `k`,
    /// `G x + H u + h ∈ cone`.  The cone must match the declared one.
    pub fn set_constraint(
        &mut self,
        G: &[T],
        H: Option<&[T]>,
        h: &[T],
        i: usize,
        k: Knot,
        cone: SupportedConeT,
    ) -> Result<(), SolverError> {
        self.update_slots(
            k,
            Target::State,
            |st| {
                let c = constraint_at(st, i)?;
                if !c.cone.same_tag(&cone) {
                    return Err(SolverError::ConfigError(
                        "cone type differs from the declared constraint",
                    ));
                }
                let p = c.cone.nvars();
                SolverError::check_len("cone dimension", p, cone.nvars())?;
                SolverError::check_len("constraint G", p * st.nx(), G.len())?;
                if let Some(H) = H {
                    SolverError::check_len("constraint H", p * st.dims.num_inputs, H.len())?;
                }
                SolverError::check_len("constraint h", p, h.len())
            },
            |st| {
                let c = &mut st.constraints[i];
                c.G.copy_from_slice(G);
                match H {
                    Some(H) => {
                        c.H.copy_from_slice(H);
                    }
                    None => {
                        c.H.data_mut().set(T::zero());
                    }
                }
                c.h.copy_from(h);
            },
        )
    }

    /// Sets the relative penalty weight of constraint `i` of step `k`
    pub fn set_penalty(&mut self, rho: T, i: usize, k: Knot) -> Result<(), SolverError> {
        if !(rho > T::zero() && rho.is_finite()) {
            return Err(SolverError::ConfigError("penalty weights must be positive"));
        }
        self.update_slots(
            k,
            Target::State,
            |st| constraint_at(st, i).map(|_| ()),
            |st| st.constraints[i].rho = rho,
        )
    }

    /// Pins the state of the first time step
    pub fn set_initial_state(&mut self, x: &[T]) -> Result<(), SolverError> {
        SolverError::check_len("initial state", self.data.x_init.len(), x.len())?;
        self.data.x_init.copy_from(x);
        Ok(())
    }

    /// Sets quadratic costs tracking the references `xref` and `uref`,
    /// i.e. `Q`, `R`, `q = -Q xref` and `r = -R uref`.  The input part is
    /// skipped for the final time step.
    pub fn set_tracking_cost(
        &mut self,
        Q: CostTerm<T>,
        R: CostTerm<T>,
        xref: &[T],
        uref: &[T],
        k: Knot,
    ) -> Result<(), SolverError> {
        let knot = k;
        let n = self.data.horizon();
        let with_input = !matches!(knot, Knot::Step(k) if k + 1 == n);

        self.check_slots(knot, Target::State, |st| {
            st.Q.check(&Q, "state cost Q")?;
            SolverError::check_len("state reference", st.nx(), xref.len())
        })?;
        if with_input {
            self.check_slots(knot, Target::Input, |st| {
                st.R.check(&R, "input cost R")?;
                SolverError::check_len("input reference", st.dims.num_inputs, uref.len())
            })?;
        }

        self.write_slots(knot, Target::State, |st| {
            st.Q.assign(&Q);
            Q.mul_into(xref, &mut st.q, -T::one());
        })?;
        if with_input {
            self.write_slots(knot, Target::Input, |st| {
                st.R.assign(&R);
                R.mul_into(uref, &mut st.r, -T::one());
            })?;
        }
        Ok(())
    }

    // ---------------------------------
    // getters
    // ---------------------------------

    /// State cost `(Q, q)` of step `k`
    pub fn get_state_cost(&self, k: usize) -> Result<(&CostMatrix<T>, &[T]), SolverError> {
        let st = self.stage_at(k, Target::State)?;
        Ok((&st.Q, &st.q))
    }

    /// Input cost `(R, r)` of step `k`
    pub fn get_input_cost(&self, k: usize) -> Result<(&CostMatrix<T>, &[T]), SolverError> {
        let st = self.stage_at(k, Target::Input)?;
        Ok((&st.R, &st.r))
    }

    pub fn get_cross_term_cost(&self, k: usize) -> Result<&Matrix<T>, SolverError> {
        if self.data.flags.block_diagonal {
            return Err(SolverError::ConfigError(
                "cross terms are not stored with block diagonal costs",
            ));
        }
        Ok(&self.stage_at(k, Target::Input)?.Hux)
    }

    pub fn get_dynamics(&self, k: usize) -> Result<&Dynamics<T>, SolverError> {
        Ok(&self.stage_at(k, Target::Input)?.dynamics)
    }

    pub fn get_constraint(&self, i: usize, k: usize) -> Result<&Constraint<T>, SolverError> {
        constraint_at(self.stage_at(k, Target::State)?, i)
    }

    pub fn get_penalty(&self, i: usize, k: usize) -> Result<T, SolverError> {
        Ok(self.get_constraint(i, k)?.rho)
    }

    pub fn get_initial_state(&self) -> &[T] {
        &self.data.x_init
    }
}

fn constraint_at<T: FloatT>(st: &StageData<T>, i: usize) -> Result<&Constraint<T>, SolverError> {
    st.constraints
        .get(i)
        .ok_or(SolverError::index("constraint", i, st.constraints.len()))
}
