#![allow(non_snake_case)]

use crate::algebra::{
    DenseFactorizationError, DenseMatrix, FactorCholesky, FloatT, Matrix, ShapedMatrix,
};
use std::collections::TryReserveError;

pub struct CholeskyEngine<T> {
    /// lower triangular factor (stored as square dense)
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let L = Matrix::<T>::zeros((n, n));
        Self { L }
    }

    /// An engine able to factor matrices up to `n x n` without reallocating
    pub fn try_with_capacity(n: usize) -> Result<Self, TryReserveError> {
        let L = Matrix::<T>::try_with_capacity(n.saturating_mul(n))?;
        Ok(Self { L })
    }

    pub fn dim(&self) -> usize {
        self.L.nrows()
    }

    /// Solve `A*X = B` in place for every column of `B`
    pub fn solve_columns(&self, B: &mut Matrix<T>) {
        assert_eq!(B.nrows(), self.dim());
        for j in 0..B.ncols() {
            self.solve(B.col_slice_mut(j));
        }
    }

    /// Overwrite `X` with the inverse of the factored matrix
    pub fn inverse_into(&self, X: &mut Matrix<T>) {
        let n = self.dim();
        X.resize_zeroed((n, n));
        X.set_identity();
        self.solve_columns(X);
    }
}

impl<T> FactorCholesky for CholeskyEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn cholesky(&mut self, A: &Matrix<T>, pivot_tol: T) -> Result<(), DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        self.L.resize_zeroed((n, n));

        let maxdiag = (0..n).fold(T::one(), |acc, i| T::max(acc, A[(i, i)].abs()));
        let tol = pivot_tol * maxdiag;

        // only the lower triangle of A is read
        let L = &mut self.L;
        for j in 0..n {
            let mut d = A[(j, j)];
            for k in 0..j {
                d -= L[(j, k)] * L[(j, k)];
            }
            // written so that NaN pivots also fail
            if !(d > tol) {
                return Err(DenseFactorizationError::Cholesky(j));
            }
            let ljj = d.sqrt();
            L[(j, j)] = ljj;

            for i in (j + 1)..n {
                let mut s = A[(i, j)];
                for k in 0..j {
                    s -= L[(i, k)] * L[(j, k)];
                }
                L[(i, j)] = s / ljj;
            }
        }

        Ok(())
    }

    fn solve(&self, b: &mut [T]) {
        let L = &self.L;
        let n = L.nrows();
        assert_eq!(b.len(), n);

        // forward substitution with L
        for i in 0..n {
            let mut s = b[i];
            for k in 0..i {
                s -= L[(i, k)] * b[k];
            }
            b[i] = s / L[(i, i)];
        }

        // backward substitution with L'
        for i in (0..n).rev() {
            let mut s = b[i];
            for k in (i + 1)..n {
                s -= L[(k, i)] * b[k];
            }
            b[i] = s / L[(i, i)];
        }
        debug_assert!(L.data().len() == n * n);
    }
}

#[test]
fn test_cholesky() {
    use crate::algebra::{MultiplyGEMM, VectorMath};

    #[rustfmt::skip]
    let S = Matrix::from(
        &[[ 8., -2., 4.],
          [-2., 12., 2.],
          [ 4.,  2., 6.]]);

    let mut eng = CholeskyEngine::<f64>::new(3);
    assert!(eng.cholesky(&S, 1e-12).is_ok());

    let mut M = Matrix::<f64>::zeros((3, 3));
    M.mul(&eng.L, &eng.L.t(), 1.0, 0.0);

    assert!(M.data().norm_inf_diff(S.data()) < 1e-8);

    // solve against a known right hand side
    let x = vec![1., -1., 2.];
    let mut b = vec![0.; 3];
    crate::algebra::MultiplyGEMV::gemv(&S, &x, &mut b, 1.0, 0.0);
    eng.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);

    let mut Sinv = Matrix::<f64>::zeros((3, 3));
    eng.inverse_into(&mut Sinv);
    let mut I = Matrix::<f64>::zeros((3, 3));
    I.mul(&S, &Sinv, 1.0, 0.0);
    assert!(I.data().norm_inf_diff(Matrix::<f64>::identity(3).data()) < 1e-12);
}

#[test]
fn test_cholesky_singular() {
    #[rustfmt::skip]
    let S = Matrix::from(
        &[[1., 0.],
          [0., 0.]]);

    let mut eng = CholeskyEngine::<f64>::new(2);
    assert!(matches!(
        eng.cholesky(&S, 1e-12),
        Err(DenseFactorizationError::Cholesky(1))
    ));

    let N = Matrix::from(&[[f64::NAN]]);
    assert!(eng.cholesky(&N, 1e-12).is_err());
}
