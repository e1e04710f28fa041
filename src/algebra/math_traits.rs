#![allow(non_snake_case)]
use super::FloatT;

// All internal math for all solver implementations should go
// through these core traits, which are implemented generically
// for floats of type FloatT.

/// Scalar operations on [`FloatT`](crate::algebra::FloatT)

pub trait ScalarMath {
    type T: FloatT;
    /// Clamps a value to the interval `[min_thresh, max_thresh]`
    fn clip(&self, min_thresh: Self::T, max_thresh: Self::T) -> Self::T;
}

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)

pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Apply an elementwise operation on a vector.
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;

    /// Apply an elementwise operation to `v` and assign the
    /// results to `self`.
    fn scalarop_from(&mut self, op: impl Fn(Self::T) -> Self::T, v: &Self) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries.
    fn negate(&mut self) -> &mut Self;

    /// Vector version of [clip](crate::algebra::ScalarMath::clip)
    fn clip(&mut self, min_thresh: Self::T, max_thresh: Self::T) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> Self::T;

    /// Standard Euclidian or 2-norm distance from `self` to `y`
    fn dist(&self, y: &Self) -> Self::T;

    /// Sum of squares of the elements.
    fn sumsq(&self) -> Self::T;

    /// 2-norm
    fn norm(&self) -> Self::T;

    /// Infinity norm
    fn norm_inf(&self) -> Self::T;

    /// Infinity norm of the difference `self - b`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    /// Minimum value in vector
    fn minimum(&self) -> Self::T;

    /// Maximum value in vector
    fn maximum(&self) -> Self::T;

    /// Checks if all elements are finite, i.e. no Infs or NaNs
    fn is_finite(&self) -> bool;

    //blas-like vector ops
    //--------------------

    /// BLAS-like shift and scale in place.  Produces `self = a*x+b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// BLAS-like shift and scale, non in-place version.  Produces `self = a*x+b*y`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
}

/// Matrix-vector products for dense matrices and their adjoints

pub trait MultiplyGEMV {
    type T: FloatT;

    /// BLAS-like general matrix-vector multiply.  Produces `y = α*self*x + β*y`
    fn gemv(&self, x: &[Self::T], y: &mut [Self::T], α: Self::T, β: Self::T);
}

/// Matrix-matrix products for dense matrices

pub trait MultiplyGEMM<MATA, MATB> {
    type T: FloatT;

    /// BLAS-like general matrix-matrix multiply.  Produces `self = α*A*B + β*self`
    fn mul(&mut self, A: &MATA, B: &MATB, α: Self::T, β: Self::T) -> &mut Self;
}

/// Cholesky factorization of dense symmetric positive definite matrices

pub trait FactorCholesky {
    type T: FloatT;

    /// Factor the lower triangle of `A`.  A pivot no larger than
    /// `pivot_tol * max(1, max|diag(A)|)` is reported as an error.
    fn cholesky(
        &mut self,
        A: &super::Matrix<Self::T>,
        pivot_tol: Self::T,
    ) -> Result<(), super::DenseFactorizationError>;

    /// Solve `A*x = b` in place using the current factors
    fn solve(&self, b: &mut [Self::T]);
}
