#![allow(non_snake_case)]

use crate::algebra::{
    Adjoint, DenseMatrix, FloatT, Matrix, MatrixShape, ShapedMatrix, VectorMath,
};
use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

impl<T> DenseMatrix<T> for Matrix<T>
where
    T: FloatT,
{
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }
    fn data(&self) -> &[T] {
        &self.data
    }
}

impl<'a, T> DenseMatrix<T> for Adjoint<'a, Matrix<T>>
where
    T: FloatT,
{
    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        self.src.index_linear((idx.1, idx.0))
    }
    fn data(&self) -> &[T] {
        &self.src.data
    }
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        mat.set_identity();
        mat
    }

    /// A zero matrix of the given size.  Fails if the memory cannot be reserved,
    /// including sizes whose entry count overflows `usize`.
    pub fn try_zeros(size: (usize, usize)) -> Result<Self, TryReserveError> {
        // a saturated count always fails the reservation
        let mut mat = Self::try_with_capacity(size.0.saturating_mul(size.1))?;
        mat.resize_zeroed(size);
        Ok(mat)
    }

    /// An empty matrix able to hold `capacity` entries without reallocating.
    /// Fails if the memory cannot be reserved.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self { m: 0, n: 0, data })
    }

    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            m,
            n,
            data: src.to_vec(),
        }
    }

    /// Checks that the data length agrees with the matrix size
    pub fn check_format(&self) -> Result<(), crate::algebra::DenseFactorizationError> {
        if self.data.len() != self.m * self.n {
            return Err(crate::algebra::DenseFactorizationError::IncompatibleDimension);
        }
        Ok(())
    }

    /// Changes the matrix size and fills it with zeros.  Does not
    /// reallocate if the new size fits within the current capacity.
    pub fn resize_zeroed(&mut self, size: (usize, usize)) -> &mut Self {
        let (m, n) = size;
        debug_assert!(m * n <= self.data.capacity());
        self.data.clear();
        self.data.resize(m * n, T::zero());
        self.m = m;
        self.n = n;
        self
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn copy_from_slice(&mut self, src: &[T]) -> &mut Self {
        self.data.copy_from_slice(src);
        self
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    pub fn set_identity(&mut self) {
        assert!(self.m == self.n);
        self.data_mut().set(T::zero());
        for i in 0..self.n {
            self[(i, i)] = T::one();
        }
    }

    /// Adds `c` to every diagonal entry
    pub fn add_diag(&mut self, c: T) -> &mut Self {
        let k = usize::min(self.m, self.n);
        for i in 0..k {
            self[(i, i)] += c;
        }
        self
    }

    /// Copies `src` into the block with top left corner `(row, col)`
    pub fn set_block<M: DenseMatrix<T>>(&mut self, row: usize, col: usize, src: &M) -> &mut Self {
        let (m, n) = src.size();
        assert!(row + m <= self.m && col + n <= self.n);
        for j in 0..n {
            for i in 0..m {
                self[(row + i, col + j)] = src[(i, j)];
            }
        }
        self
    }

    /// Adds `α*src` into the block with top left corner `(row, col)`
    pub fn add_block<M: DenseMatrix<T>>(
        &mut self,
        row: usize,
        col: usize,
        src: &M,
        α: T,
    ) -> &mut Self {
        let (m, n) = src.size();
        assert!(row + m <= self.m && col + n <= self.n);
        for j in 0..n {
            for i in 0..m {
                self[(row + i, col + j)] += α * src[(i, j)];
            }
        }
        self
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data()[self.index_linear(idx)]
    }
}

impl<T> Index<(usize, usize)> for Adjoint<'_, Matrix<T>>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data()[self.index_linear(idx)]
    }
}

impl<T> ShapedMatrix for Matrix<T>
where
    T: FloatT,
{
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

impl<'a, T> ShapedMatrix for Adjoint<'a, Matrix<T>>
where
    T: FloatT,
{
    fn nrows(&self) -> usize {
        self.src.ncols()
    }
    fn ncols(&self) -> usize {
        self.src.nrows()
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::T
    }
}

// construct from a row-major nested array, mostly for tests
impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for Matrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Matrix<T> {
        let mut A = Matrix::zeros((M, N));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                A[(i, j)] = v;
            }
        }
        A
    }
}

#[test]
fn test_matrix_from_rows() {
    #[rustfmt::skip]
    let A = Matrix::from(
        &[[1., 3.],
          [2., 4.],
          [0., 5.]]);

    assert_eq!(A.size(), (3, 2));
    assert_eq!(A.data(), &[1., 2., 0., 3., 4., 5.]);
    assert_eq!(A.t()[(1, 2)], 5.);
    assert!(A.check_format().is_ok());
}

#[test]
fn test_resize_within_capacity() {
    let mut A = Matrix::<f64>::try_with_capacity(12).unwrap();
    let ptr = A.data.as_ptr();
    A.resize_zeroed((3, 4));
    A.add_diag(2.);
    assert_eq!(A[(2, 2)], 2.);
    A.resize_zeroed((2, 2));
    assert_eq!(A.data(), &[0.; 4]);
    assert_eq!(A.data.as_ptr(), ptr);
}

#[test]
fn test_blocks() {
    let mut A = Matrix::<f64>::zeros((3, 3));
    let I = Matrix::<f64>::identity(2);
    A.set_block(1, 1, &I);
    A.add_block(0, 0, &I, 2.0);
    assert_eq!(A[(0, 0)], 2.);
    assert_eq!(A[(1, 1)], 3.);
    assert_eq!(A[(2, 2)], 1.);
    assert_eq!(A[(2, 1)], 0.);
}
