#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, SupportedConeT},
    storage::StorageMapper,
    traits::ProblemData,
    SolverError,
};
use itertools::Either;
use std::collections::TryReserveError;
use std::iter::zip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// user facing problem declarations
// ---------------------------------

/// Structural options fixed at solver construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverFlags {
    /// quadratic costs `Q` and `R` are diagonal and passed as diagonals
    pub diagonal_costs: bool,
    /// the cross term `H` between inputs and states is zero
    pub block_diagonal: bool,
    /// dynamics read `x' = x + h (A x + B u + f)`
    pub explicit_integration: bool,
}

/// Time step addressed by a setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knot {
    /// A single time step
    Step(usize),
    /// Every storage slot used by the horizon
    All,
}

impl Knot {
    /// Converts an integer time step index, where `-1` addresses all time steps.
    pub fn from_index(k: i64) -> Result<Self, SolverError> {
        match k {
            -1 => Ok(Knot::All),
            k if k >= 0 => Ok(Knot::Step(k as usize)),
            k => Err(SolverError::IndexError {
                what: "time step",
                index: k,
                bound: 0,
            }),
        }
    }
}

impl From<usize> for Knot {
    fn from(k: usize) -> Self {
        Knot::Step(k)
    }
}

/// Dimensions and constraint declarations of one storage slot.
///
/// `num_next_states` and `num_next_inputs` give the size of the time step the
/// slot's dynamics couple into.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageDims {
    pub num_states: usize,
    pub num_inputs: usize,
    pub num_next_states: usize,
    pub num_next_inputs: usize,
    pub cones: Vec<SupportedConeT>,
}

impl StageDims {
    /// A slot whose dynamics map into a step of the same size
    pub fn new(num_states: usize, num_inputs: usize, cones: &[SupportedConeT]) -> Self {
        Self {
            num_states,
            num_inputs,
            num_next_states: num_states,
            num_next_inputs: num_inputs,
            cones: cones.to_vec(),
        }
    }

    pub fn with_next(mut self, num_next_states: usize, num_next_inputs: usize) -> Self {
        self.num_next_states = num_next_states;
        self.num_next_inputs = num_next_inputs;
        self
    }

    pub fn num_constraints(&self) -> usize {
        self.cones.len()
    }

    /// total number of constraint rows
    pub fn constraint_rows(&self) -> usize {
        self.cones
            .iter()
            .fold(0, |acc: usize, c| acc.saturating_add(c.nvars()))
    }

    fn validate(&self) -> Result<(), SolverError> {
        if self.num_states == 0 || self.num_next_states == 0 {
            return Err(SolverError::ConfigError(
                "every time step needs at least one state",
            ));
        }
        if self.cones.iter().any(|c| c.nvars() == 0) {
            return Err(SolverError::ConfigError(
                "constraints need at least one dimension",
            ));
        }
        Ok(())
    }
}

/// Input format of a quadratic cost term.  Dense data is column major.
#[derive(Debug, Clone, Copy)]
pub enum CostTerm<'a, T> {
    Diagonal(&'a [T]),
    Dense(&'a [T]),
}

impl<'a, T> CostTerm<'a, T>
where
    T: FloatT,
{
    /// `out = α M x` for the square term `M` of dimension `x.len()`
    pub(crate) fn mul_into(&self, x: &[T], out: &mut [T], α: T) {
        match self {
            CostTerm::Diagonal(d) => {
                for (o, (&di, &xi)) in zip(out.iter_mut(), zip(d.iter(), x)) {
                    *o = α * di * xi;
                }
            }
            CostTerm::Dense(v) => {
                let n = x.len();
                out.set(T::zero());
                for (j, &xj) in x.iter().enumerate() {
                    out.axpby(α * xj, &v[j * n..(j + 1) * n], T::one());
                }
            }
        }
    }
}

/// Stored quadratic cost term.
#[derive(Debug, Clone, PartialEq)]
pub enum CostMatrix<T = f64> {
    Diagonal(Vec<T>),
    Dense(Matrix<T>),
}

impl<T> CostMatrix<T>
where
    T: FloatT,
{
    fn try_zeros(n: usize, diagonal: bool) -> Result<Self, TryReserveError> {
        if diagonal {
            Ok(CostMatrix::Diagonal(try_zeros(n)?))
        } else {
            Ok(CostMatrix::Dense(Matrix::try_zeros((n, n))?))
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            CostMatrix::Diagonal(d) => d.len(),
            CostMatrix::Dense(M) => M.nrows(),
        }
    }

    pub fn is_diagonal(&self) -> bool {
        matches!(self, CostMatrix::Diagonal(_))
    }

    pub(crate) fn check(&self, term: &CostTerm<T>, what: &'static str) -> Result<(), SolverError> {
        let n = self.dim();
        match (self, term) {
            (CostMatrix::Diagonal(_), CostTerm::Dense(_)) => Err(SolverError::ConfigError(
                "dense cost data passed to a solver with diagonal costs",
            )),
            (_, CostTerm::Diagonal(v)) => SolverError::check_len(what, n, v.len()),
            (_, CostTerm::Dense(v)) => SolverError::check_len(what, n * n, v.len()),
        }
    }

    // callers run `check` first
    pub(crate) fn assign(&mut self, term: &CostTerm<T>) {
        match (self, term) {
            (CostMatrix::Diagonal(d), CostTerm::Diagonal(v)) => {
                d.copy_from(v);
            }
            (CostMatrix::Dense(M), CostTerm::Diagonal(v)) => {
                M.data_mut().set(T::zero());
                for (i, &vi) in v.iter().enumerate() {
                    M[(i, i)] = vi;
                }
            }
            (CostMatrix::Dense(M), CostTerm::Dense(v)) => {
                M.copy_from_slice(v);
            }
            (CostMatrix::Diagonal(_), CostTerm::Dense(_)) => unreachable!(),
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        match self {
            CostMatrix::Diagonal(d) => d,
            CostMatrix::Dense(M) => M.data_mut(),
        }
    }

    pub fn data(&self) -> &[T] {
        match self {
            CostMatrix::Diagonal(d) => d,
            CostMatrix::Dense(M) => M.data(),
        }
    }

    /// `P[offset.., offset..] += self`, restricted to the leading `n x n` block
    fn add_into(&self, P: &mut Matrix<T>, offset: usize, n: usize) {
        match self {
            CostMatrix::Diagonal(d) => {
                for (i, &di) in d.iter().take(n).enumerate() {
                    P[(offset + i, offset + i)] += di;
                }
            }
            CostMatrix::Dense(M) => {
                for j in 0..n {
                    for i in 0..n {
                        P[(offset + i, offset + j)] += M[(i, j)];
                    }
                }
            }
        }
    }

    /// `y += self * x`, using the leading `x.len()` block
    fn mul_add(&self, x: &[T], y: &mut [T]) {
        match self {
            CostMatrix::Diagonal(d) => {
                for (yi, (&di, &xi)) in zip(y, zip(d, x)) {
                    *yi += di * xi;
                }
            }
            CostMatrix::Dense(M) => {
                for (j, &xj) in x.iter().enumerate() {
                    for (yi, &mij) in zip(y.iter_mut(), &M.col_slice(j)[..x.len()]) {
                        *yi += mij * xj;
                    }
                }
            }
        }
    }
}

/// Coefficients of one conic constraint `G x + H u + h ∈ K`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint<T = f64> {
    pub G: Matrix<T>,
    pub H: Matrix<T>,
    pub h: Vec<T>,
    /// relative penalty weight
    pub rho: T,
    pub cone: SupportedConeT,
}

/// Dynamics coupling a time step to the next one,
/// `A x + B u + C x' + D u' + f = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamics<T = f64> {
    pub A: Matrix<T>,
    pub B: Matrix<T>,
    pub C: Matrix<T>,
    pub D: Matrix<T>,
    pub f: Vec<T>,
    /// time step, used by explicit integration
    pub h: T,
}

// ---------------------------------
// per slot storage
// ---------------------------------

/// Problem data held by one storage slot.
#[derive(Debug)]
pub struct StageData<T: FloatT = f64> {
    pub(crate) dims: StageDims,
    pub(crate) Q: CostMatrix<T>,
    pub(crate) q: Vec<T>,
    pub(crate) R: CostMatrix<T>,
    pub(crate) r: Vec<T>,
    pub(crate) Hux: Matrix<T>,
    pub(crate) dynamics: Dynamics<T>,
    pub(crate) constraints: Vec<Constraint<T>>,
    pub(crate) cones: CompositeCone<T>,
    pub(crate) flags: SolverFlags,
}

impl<T> StageData<T>
where
    T: FloatT,
{
    pub(crate) fn try_new(dims: &StageDims, flags: SolverFlags) -> Result<Self, SolverError> {
        dims.validate()?;
        let (nx, nu) = (dims.num_states, dims.num_inputs);
        let (nxn, nun) = (dims.num_next_states, dims.num_next_inputs);

        let mut cones_decl = Vec::new();
        cones_decl.try_reserve_exact(dims.cones.len())?;
        cones_decl.extend_from_slice(&dims.cones);

        let mut constraints = Vec::new();
        constraints.try_reserve_exact(dims.cones.len())?;
        for cone in dims.cones.iter() {
            let p = cone.nvars();
            constraints.push(Constraint {
                G: Matrix::try_zeros((p, nx))?,
                H: Matrix::try_zeros((p, nu))?,
                h: try_zeros(p)?,
                rho: T::one(),
                cone: *cone,
            });
        }

        let mut C = Matrix::try_zeros((nxn, nxn))?;
        C.set_identity();

        let dynamics = Dynamics {
            A: Matrix::try_zeros((nxn, nx))?,
            B: Matrix::try_zeros((nxn, nu))?,
            C,
            D: Matrix::try_zeros((nxn, nun))?,
            f: try_zeros(nxn)?,
            h: T::one(),
        };

        let hux_size = if flags.block_diagonal { (0, 0) } else { (nu, nx) };

        Ok(Self {
            dims: StageDims {
                num_states: nx,
                num_inputs: nu,
                num_next_states: nxn,
                num_next_inputs: nun,
                cones: cones_decl,
            },
            Q: CostMatrix::try_zeros(nx, flags.diagonal_costs)?,
            q: try_zeros(nx)?,
            R: CostMatrix::try_zeros(nu, flags.diagonal_costs)?,
            r: try_zeros(nu)?,
            Hux: Matrix::try_zeros(hux_size)?,
            dynamics,
            constraints,
            cones: CompositeCone::try_new(&dims.cones)?,
            flags,
        })
    }

    pub fn dims(&self) -> &StageDims {
        &self.dims
    }

    /// Zeroes every coefficient.  The time step is kept and penalties are reset.
    pub(crate) fn clear(&mut self) {
        self.Q.data_mut().set(T::zero());
        self.q.set(T::zero());
        self.R.data_mut().set(T::zero());
        self.r.set(T::zero());
        self.Hux.data_mut().set(T::zero());

        let dyn_ = &mut self.dynamics;
        dyn_.A.data_mut().set(T::zero());
        dyn_.B.data_mut().set(T::zero());
        dyn_.C.set_identity();
        dyn_.D.data_mut().set(T::zero());
        dyn_.f.set(T::zero());

        for c in self.constraints.iter_mut() {
            c.G.data_mut().set(T::zero());
            c.H.data_mut().set(T::zero());
            c.h.set(T::zero());
            c.rho = T::one();
        }
    }

    /// Copies every coefficient of a slot with identical dimensions
    pub(crate) fn copy_from(&mut self, src: &Self) {
        debug_assert!(self.dims == src.dims);
        self.Q.data_mut().copy_from(src.Q.data());
        self.q.copy_from(&src.q);
        self.R.data_mut().copy_from(src.R.data());
        self.r.copy_from(&src.r);
        self.Hux.copy_from_slice(src.Hux.data());

        let (d, s) = (&mut self.dynamics, &src.dynamics);
        d.A.copy_from_slice(s.A.data());
        d.B.copy_from_slice(s.B.data());
        d.C.copy_from_slice(s.C.data());
        d.D.copy_from_slice(s.D.data());
        d.f.copy_from(&s.f);
        d.h = s.h;

        for (c, cs) in zip(self.constraints.iter_mut(), src.constraints.iter()) {
            c.G.copy_from_slice(cs.G.data());
            c.H.copy_from_slice(cs.H.data());
            c.h.copy_from(&cs.h);
            c.rho = cs.rho;
        }
    }

    pub(crate) fn nx(&self) -> usize {
        self.dims.num_states
    }

    pub(crate) fn numel(&self) -> usize {
        self.cones.numel
    }

    // ---------------------------------
    // stage cost
    // ---------------------------------

    /// `P += [[Q, Hᵀ],[H, R]]` over the leading `nu` inputs
    pub(crate) fn add_cost_hessian(&self, nu: usize, P: &mut Matrix<T>) {
        let nx = self.nx();
        self.Q.add_into(P, 0, nx);
        if nu == 0 {
            return;
        }
        self.R.add_into(P, nx, nu);
        if !self.flags.block_diagonal {
            for j in 0..nx {
                for i in 0..nu {
                    let hij = self.Hux[(i, j)];
                    P[(nx + i, j)] += hij;
                    P[(j, nx + i)] += hij;
                }
            }
        }
    }

    /// `out += [q; r]`
    pub(crate) fn add_cost_gradient(&self, nu: usize, out: &mut [T]) {
        let (ox, ou) = out.split_at_mut(self.nx());
        ox.axpby(T::one(), &self.q, T::one());
        ou.axpby(T::one(), &self.r[..nu], T::one());
    }

    /// `out += [[Q, Hᵀ],[H, R]] w`
    pub(crate) fn mul_cost_hessian(&self, nu: usize, w: &[T], out: &mut [T]) {
        let nx = self.nx();
        let (x, u) = w.split_at(nx);
        let (ox, ou) = out.split_at_mut(nx);
        self.Q.mul_add(x, ox);
        if nu == 0 {
            return;
        }
        self.R.mul_add(u, ou);
        if !self.flags.block_diagonal {
            // rows of Hux beyond nu never apply
            for j in 0..nx {
                let col = &self.Hux.col_slice(j)[..nu];
                ox[j] += col.dot(u);
                ou.axpby(x[j], col, T::one());
            }
        }
    }

    // ---------------------------------
    // constraints
    // ---------------------------------

    // column `a` of J = [G H]
    fn jcol<'a>(c: &'a Constraint<T>, nx: usize, a: usize) -> &'a [T] {
        if a < nx {
            c.G.col_slice(a)
        } else {
            c.H.col_slice(a - nx)
        }
    }

    /// `P += Σ ρ_i J_iᵀ J_i` with `ρ_i = rho * relative weight`
    pub(crate) fn add_constraint_hessian(&self, nu: usize, rho: T, P: &mut Matrix<T>) {
        let nx = self.nx();
        let nw = nx + nu;
        for c in self.constraints.iter() {
            let ρ = rho * c.rho;
            for b in 0..nw {
                let jb = Self::jcol(c, nx, b);
                for a in b..nw {
                    let v = ρ * Self::jcol(c, nx, a).dot(jb);
                    P[(a, b)] += v;
                    if a != b {
                        P[(b, a)] += v;
                    }
                }
            }
        }
    }

    /// `s_i = G_i x + H_i u + h_i` for every constraint, stacked
    pub(crate) fn constraint_values(&self, nu: usize, w: &[T], s: &mut [T]) {
        let nx = self.nx();
        let (x, u) = w.split_at(nx);
        for (c, rng) in zip(self.constraints.iter(), self.cones.rng_cones.iter()) {
            let si = &mut s[rng.clone()];
            si.copy_from(&c.h);
            gemv_cols(&c.G, x, si, T::one());
            gemv_cols(&c.H, &u[..nu], si, T::one());
        }
    }

    /// `out += α Σ J_iᵀ v_i` for a stacked constraint vector `v`
    pub(crate) fn add_constraint_t(&self, nu: usize, v: &[T], out: &mut [T], α: T) {
        let nx = self.nx();
        let (ox, ou) = out.split_at_mut(nx);
        for (c, rng) in zip(self.constraints.iter(), self.cones.rng_cones.iter()) {
            let vi = &v[rng.clone()];
            gemv_cols_t(&c.G, vi, ox, α);
            gemv_cols_t(&c.H, vi, &mut ou[..nu], α);
        }
    }

    /// `Σ_i v_iᵀ h_i`
    pub(crate) fn dot_constraint_offsets(&self, v: &[T]) -> T {
        zip(self.constraints.iter(), self.cones.rng_cones.iter())
            .fold(T::zero(), |acc, (c, rng)| acc + c.h.dot(&v[rng.clone()]))
    }

    // ---------------------------------
    // dynamics: exit side E = [A B] of this step,
    // entry side F = [C D] of the next step
    // ---------------------------------

    /// `out = α E w + β out`
    pub(crate) fn exit_mul(&self, nu: usize, w: &[T], out: &mut [T], α: T, β: T) {
        let (x, u) = w.split_at(self.nx());
        let d = &self.dynamics;
        scale_or_zero(out, β);
        if self.flags.explicit_integration {
            // E = [I + hA, hB]
            out.axpby(α, x, T::one());
            gemv_cols(&d.A, x, out, α * d.h);
            gemv_cols(&d.B, &u[..nu], out, α * d.h);
        } else {
            gemv_cols(&d.A, x, out, α);
            gemv_cols(&d.B, &u[..nu], out, α);
        }
    }

    /// `out = α Eᵀ v + β out`
    pub(crate) fn exit_mul_t(&self, nu: usize, v: &[T], out: &mut [T], α: T, β: T) {
        let d = &self.dynamics;
        scale_or_zero(out, β);
        let (ox, ou) = out.split_at_mut(self.nx());
        if self.flags.explicit_integration {
            ox.axpby(α, v, T::one());
            gemv_cols_t(&d.A, v, ox, α * d.h);
            gemv_cols_t(&d.B, v, &mut ou[..nu], α * d.h);
        } else {
            gemv_cols_t(&d.A, v, ox, α);
            gemv_cols_t(&d.B, v, &mut ou[..nu], α);
        }
    }

    /// Writes `E` for `nu` inputs into `E`, resized within its capacity
    pub(crate) fn assemble_exit(&self, nu: usize, E: &mut Matrix<T>) {
        let nx = self.nx();
        let d = &self.dynamics;
        E.resize_zeroed((self.dims.num_next_states, nx + nu));
        let scale = if self.flags.explicit_integration {
            d.h
        } else {
            T::one()
        };
        E.add_block(0, 0, &d.A, scale);
        for j in 0..nu {
            E.col_slice_mut(nx + j)
                .axpby(scale, d.B.col_slice(j), T::one());
        }
        if self.flags.explicit_integration {
            E.add_diag(T::one());
        }
    }

    /// `out += α f`, or `α h f` with explicit integration
    pub(crate) fn add_affine(&self, out: &mut [T], α: T) {
        let d = &self.dynamics;
        let scale = if self.flags.explicit_integration {
            α * d.h
        } else {
            α
        };
        out.axpby(scale, &d.f, T::one());
    }

    /// `vᵀ f_eff`
    pub(crate) fn dot_affine(&self, v: &[T]) -> T {
        let d = &self.dynamics;
        let scale = if self.flags.explicit_integration {
            d.h
        } else {
            T::one()
        };
        scale * d.f.dot(v)
    }

    /// `out = α F w' + β out` for the next step's `w' = (x', u')`
    pub(crate) fn entry_mul(&self, nu_next: usize, w: &[T], out: &mut [T], α: T, β: T) {
        let (x, u) = w.split_at(self.dims.num_next_states);
        let d = &self.dynamics;
        scale_or_zero(out, β);
        if self.flags.explicit_integration {
            // F = [-I 0]
            out.axpby(-α, x, T::one());
        } else {
            gemv_cols(&d.C, x, out, α);
            gemv_cols(&d.D, &u[..nu_next], out, α);
        }
    }

    /// `out = α Fᵀ v + β out`
    pub(crate) fn entry_mul_t(&self, nu_next: usize, v: &[T], out: &mut [T], α: T, β: T) {
        let d = &self.dynamics;
        scale_or_zero(out, β);
        let (ox, ou) = out.split_at_mut(self.dims.num_next_states);
        if self.flags.explicit_integration {
            ox.axpby(-α, v, T::one());
        } else {
            gemv_cols_t(&d.C, v, ox, α);
            gemv_cols_t(&d.D, v, &mut ou[..nu_next], α);
        }
    }

    /// Writes `F` of the next step into `F`, resized within its capacity
    pub(crate) fn assemble_entry(&self, nu_next: usize, F: &mut Matrix<T>) {
        let nxn = self.dims.num_next_states;
        let d = &self.dynamics;
        F.resize_zeroed((nxn, nxn + nu_next));
        if self.flags.explicit_integration {
            for i in 0..nxn {
                F[(i, i)] = -T::one();
            }
        } else {
            F.set_block(0, 0, &d.C);
            for j in 0..nu_next {
                F.col_slice_mut(nxn + j).copy_from(d.D.col_slice(j));
            }
        }
    }
}

// y += α M[:, 0..x.len()] x
fn gemv_cols<T: FloatT>(M: &Matrix<T>, x: &[T], y: &mut [T], α: T) {
    for (j, &xj) in x.iter().enumerate() {
        let c = α * xj;
        if c == T::zero() {
            continue;
        }
        y.axpby(c, M.col_slice(j), T::one());
    }
}

// y += α M[:, 0..y.len()]ᵀ x
fn gemv_cols_t<T: FloatT>(M: &Matrix<T>, x: &[T], y: &mut [T], α: T) {
    for (j, yj) in y.iter_mut().enumerate() {
        *yj += α * M.col_slice(j).dot(x);
    }
}

fn scale_or_zero<T: FloatT>(v: &mut [T], β: T) {
    if β == T::zero() {
        v.set(T::zero());
    } else if β != T::one() {
        v.scale(β);
    }
}

// ---------------------------------
// problem data
// ---------------------------------

/// Largest dimensions over all storage slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MaxDims {
    pub nx: usize,
    pub nu: usize,
    pub nw: usize,
    pub nrows: usize,
}

/// Standard problem data type implementing the [`ProblemData`](crate::solver::core::traits::ProblemData) trait
#[derive(Debug)]
pub struct DefaultProblemData<T: FloatT> {
    pub(crate) stages: Vec<StageData<T>>,
    pub(crate) mapper: StorageMapper,
    pub(crate) x_init: Vec<T>,
    pub(crate) flags: SolverFlags,
    pub(crate) max: MaxDims,
}

impl<T> DefaultProblemData<T>
where
    T: FloatT,
{
    pub(crate) fn try_new(
        stage_dims: &[StageDims],
        map: &[usize],
        capacity: usize,
        flags: SolverFlags,
    ) -> Result<Self, SolverError> {
        let num_data = stage_dims.len();
        let mapper = StorageMapper::try_new(map, num_data, capacity)?;

        let mut stages = Vec::new();
        stages.try_reserve_exact(num_data)?;
        for dims in stage_dims {
            stages.push(StageData::try_new(dims, flags)?);
        }

        let max = stage_dims.iter().fold(MaxDims::default(), |m, d| MaxDims {
            nx: usize::max(m.nx, d.num_states),
            nu: usize::max(m.nu, d.num_inputs),
            nw: usize::max(m.nw, d.num_states.saturating_add(d.num_inputs)),
            nrows: usize::max(m.nrows, d.constraint_rows()),
        });

        check_chain(&stages, mapper.window())?;

        let mut x_init = Vec::new();
        x_init.try_reserve_exact(max.nx)?;
        x_init.resize(stages[map[0]].nx(), T::zero());

        Ok(Self {
            stages,
            mapper,
            x_init,
            flags,
            max,
        })
    }

    pub(crate) fn stage(&self, k: usize) -> &StageData<T> {
        &self.stages[self.mapper.slot(k)]
    }

    pub(crate) fn nx(&self, k: usize) -> usize {
        self.stage(k).nx()
    }

    /// inputs of step `k`; the final step has none
    pub(crate) fn nu(&self, k: usize) -> usize {
        if k + 1 < self.horizon() {
            self.stage(k).dims.num_inputs
        } else {
            0
        }
    }

    pub(crate) fn nw(&self, k: usize) -> usize {
        self.nx(k) + self.nu(k)
    }

    pub(crate) fn numel(&self, k: usize) -> usize {
        self.stage(k).numel()
    }

    /// Called after the window changed
    pub(crate) fn conform_initial_state(&mut self) {
        let nx0 = self.nx(0);
        self.x_init.resize(nx0, T::zero());
    }
}

impl<T> ProblemData<T> for DefaultProblemData<T>
where
    T: FloatT,
{
    type V = DefaultVariables<T>;
    type SE = DefaultSettings<T>;

    fn horizon(&self) -> usize {
        self.mapper.num_horizon()
    }
}

/// Verifies that the dynamics of each step of `window` map into
/// the dimensions of the step after it
pub(crate) fn check_chain<T: FloatT>(
    stages: &[StageData<T>],
    window: &[usize],
) -> Result<(), SolverError> {
    check_chain_by(stages, window.len(), |k| window[k])
}

/// As [`check_chain`], for the `n` step window given by `slot_of`
pub(crate) fn check_chain_by<T: FloatT>(
    stages: &[StageData<T>],
    n: usize,
    slot_of: impl Fn(usize) -> usize,
) -> Result<(), SolverError> {
    for k in 0..n.saturating_sub(1) {
        let (this, next) = (&stages[slot_of(k)].dims, &stages[slot_of(k + 1)].dims);
        SolverError::check_len(
            "next state dimension",
            next.num_states,
            this.num_next_states,
        )?;
        if k + 2 < n {
            SolverError::check_len(
                "next input dimension",
                next.num_inputs,
                this.num_next_inputs,
            )?;
        }
    }
    Ok(())
}

/// Storage slots addressed by `knot`, where single steps must lie in `[0, bound)`
pub(crate) fn target_slots(
    mapper: &StorageMapper,
    knot: Knot,
    bound: usize,
) -> Result<impl Iterator<Item = usize> + '_, SolverError> {
    match knot {
        Knot::All => Ok(Either::Right(mapper.reachable_slots())),
        Knot::Step(k) if k < bound => Ok(Either::Left(std::iter::once(mapper.slot(k)))),
        Knot::Step(k) => Err(SolverError::index("time step", k, bound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::cones::SupportedConeT::*;

    fn stage(flags: SolverFlags) -> StageData<f64> {
        let dims = StageDims::new(2, 1, &[NegativeOrthantConeT(1), SecondOrderConeT(3)]);
        let mut st = StageData::<f64>::try_new(&dims, flags).unwrap();
        st.dynamics.A.copy_from_slice(&[1., 3., 2., 4.]);
        st.dynamics.B.copy_from_slice(&[0.5, -1.]);
        st.dynamics.f.copy_from_slice(&[0.1, 0.2]);
        st.dynamics.h = 0.1;
        st.constraints[0].G.copy_from_slice(&[1., 2.]);
        st.constraints[0].H.copy_from_slice(&[3.]);
        st.constraints[0].h.copy_from_slice(&[-1.]);
        st.constraints[1].G.copy_from_slice(&[1., 0., 0., 0., 1., 0.]);
        st.constraints[1].H.copy_from_slice(&[0., 0., 1.]);
        st.constraints[1].h.copy_from_slice(&[2., 0., 0.]);
        st.constraints[1].rho = 2.0;
        st
    }

    #[test]
    fn test_knot_from_index() {
        assert_eq!(Knot::from_index(-1), Ok(Knot::All));
        assert_eq!(Knot::from_index(3), Ok(Knot::Step(3)));
        assert!(matches!(
            Knot::from_index(-2),
            Err(SolverError::IndexError { index: -2, .. })
        ));
        let msg = Knot::from_index(-2).unwrap_err().to_string();
        assert_eq!(
            msg,
            "time step index -2 is negative, only -1 (every time step) is accepted"
        );
        assert_eq!(Knot::from(4), Knot::Step(4));
    }

    #[test]
    fn test_cost_matrix_assign() {
        let mut M = CostMatrix::<f64>::try_zeros(2, false).unwrap();
        let diag = CostTerm::Diagonal(&[1., 2.]);
        M.check(&diag, "Q").unwrap();
        M.assign(&diag);
        assert_eq!(M, CostMatrix::Dense(Matrix::from(&[[1., 0.], [0., 2.]])));

        let mut D = CostMatrix::<f64>::try_zeros(2, true).unwrap();
        assert!(matches!(
            D.check(&CostTerm::Dense(&[1., 0., 0., 1.]), "Q"),
            Err(SolverError::ConfigError(_))
        ));
        assert!(matches!(
            D.check(&CostTerm::Diagonal(&[1.]), "Q"),
            Err(SolverError::DimensionError {
                expected: 2,
                found: 1,
                ..
            })
        ));
        D.assign(&diag);
        let mut y = vec![1., 1.];
        D.mul_add(&[3., 4.], &mut y);
        assert_eq!(y, vec![4., 9.]);
    }

    #[test]
    fn test_exit_products_match_assembly() {
        for explicit in [false, true] {
            let flags = SolverFlags {
                explicit_integration: explicit,
                ..SolverFlags::default()
            };
            let st = stage(flags);
            let mut E = Matrix::<f64>::try_with_capacity(6).unwrap();
            st.assemble_exit(1, &mut E);
            assert_eq!(E.size(), (2, 3));

            let w = [1., -2., 0.5];
            let (mut y1, mut y2) = (vec![0.; 2], vec![0.; 2]);
            st.exit_mul(1, &w, &mut y1, 1.0, 0.0);
            E.gemv(&w, &mut y2, 1.0, 0.0);
            assert!(y1.norm_inf_diff(&y2) < 1e-14);

            let v = [2., -1.];
            let (mut z1, mut z2) = (vec![0.; 3], vec![0.; 3]);
            st.exit_mul_t(1, &v, &mut z1, 1.0, 0.0);
            E.t().gemv(&v, &mut z2, 1.0, 0.0);
            assert!(z1.norm_inf_diff(&z2) < 1e-14);
        }

        // explicit integration: E = [I + hA, hB]
        let st = stage(SolverFlags {
            explicit_integration: true,
            ..SolverFlags::default()
        });
        let mut E = Matrix::<f64>::zeros((2, 3));
        st.assemble_exit(1, &mut E);
        assert!((E[(0, 0)] - 1.1).abs() < 1e-14);
        assert!((E[(1, 0)] - 0.3).abs() < 1e-14);
        assert!((E[(1, 2)] + 0.1).abs() < 1e-14);

        let mut F = Matrix::<f64>::zeros((2, 3));
        st.assemble_entry(1, &mut F);
        assert_eq!(F.data(), &[-1., 0., 0., -1., 0., 0.]);
    }

    #[test]
    fn test_constraint_hessian() {
        let st = stage(SolverFlags::default());

        let mut P = Matrix::<f64>::zeros((3, 3));
        st.add_constraint_hessian(1, 0.5, &mut P);

        // ρ = 0.5 for the first constraint, 1.0 for the second
        let mut Pref = Matrix::<f64>::zeros((3, 3));
        let J0 = Matrix::from(&[[1., 2., 3.]]);
        let J1 = Matrix::from(&[[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]]);
        Pref.mul(&J0.t(), &J0, 0.5, 1.0);
        Pref.mul(&J1.t(), &J1, 1.0, 1.0);
        assert!(P.data().norm_inf_diff(Pref.data()) < 1e-14);

        // terminal steps ignore the input columns
        let mut P = Matrix::<f64>::zeros((2, 2));
        st.add_constraint_hessian(0, 1.0, &mut P);
        assert_eq!(P.data(), &[3., 2., 2., 6.]);

        let mut s = vec![0.; 4];
        st.constraint_values(1, &[1., 1., 1.], &mut s);
        assert_eq!(s, vec![5., 3., 1., 1.]);
        assert_eq!(st.dot_constraint_offsets(&s), 1.);

        let mut g = vec![0.; 3];
        st.add_constraint_t(1, &[1., 0., 0., 1.], &mut g, 1.0);
        assert_eq!(g, vec![1., 2., 4.]);
    }

    #[test]
    fn test_clear_and_copy() {
        let src = stage(SolverFlags::default());
        let mut dst = stage(SolverFlags::default());
        dst.clear();
        assert_eq!(dst.constraints[1].rho, 1.0);
        assert_eq!(dst.dynamics.h, 0.1);
        assert_eq!(dst.dynamics.C, Matrix::identity(2));
        assert!(dst.dynamics.A.data().iter().all(|&a| a == 0.));
        dst.copy_from(&src);
        assert_eq!(dst.dynamics, src.dynamics);
        assert_eq!(dst.constraints, src.constraints);
    }

    #[test]
    fn test_chain_consistency() {
        let flags = SolverFlags::default();
        let a = StageDims::new(2, 1, &[]).with_next(3, 1);
        let b = StageDims::new(3, 1, &[]);
        let stages: Vec<StageData<f64>> = [a, b]
            .iter()
            .map(|d| StageData::try_new(d, flags).unwrap())
            .collect();
        assert!(check_chain(&stages, &[0, 1]).is_ok());
        assert!(check_chain(&stages, &[0, 1, 1]).is_ok());
        assert!(matches!(
            check_chain(&stages, &[0, 0]),
            Err(SolverError::DimensionError { .. })
        ));
        assert!(check_chain(&stages, &[1]).is_ok());
    }
}
