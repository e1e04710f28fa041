use crate::algebra::FloatT;
use std::ops::Index;

/// Dense matrix in column major format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use cocoa::algebra::Matrix;
///
/// let A : Matrix<f64> = Matrix::new_from_slice(
///    (3, 3),                               // size as tuple
///    &[1., 2., 0., 3., 0., 4., 5., 6., 7.] // data in column major order
/// );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
/// ```

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub(crate) m: usize,
    /// number of columns
    pub(crate) n: usize,
    /// vector of data in column major format
    pub(crate) data: Vec<T>,
}

/// Read only adjoint view of a matrix
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Matrix orientation marker used for BLAS-like calls
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    N,
    T,
}

/// Size queries common to matrices and matrix views
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn shape(&self) -> MatrixShape;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

//NB: the concrete dense type is just called "Matrix".  The "DenseMatrix" trait
//is implemented on Matrix and Adjoint to allow for indexing of values in
//either format.   This follows the Julia naming convention for similar types.
pub trait DenseMatrix<T: FloatT>: ShapedMatrix + Index<(usize, usize), Output = T> {
    fn index_linear(&self, idx: (usize, usize)) -> usize;
    fn data(&self) -> &[T];
}
