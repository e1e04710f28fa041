#![allow(non_snake_case)]

use crate::algebra::{DenseMatrix, FloatT, Matrix, MultiplyGEMM, ShapedMatrix};

impl<T, MATA, MATB> MultiplyGEMM<MATA, MATB> for Matrix<T>
where
    T: FloatT,
    MATA: DenseMatrix<T>,
    MATB: DenseMatrix<T>,
{
    type T = T;
    // implements self = α*A*B + β*self
    fn mul(&mut self, A: &MATA, B: &MATB, α: T, β: T) -> &mut Self {
        assert!(A.ncols() == B.nrows() && self.nrows() == A.nrows() && self.ncols() == B.ncols());

        let (m, n) = self.size();
        let kdim = A.ncols();

        for j in 0..n {
            for i in 0..m {
                let mut acc = T::zero();
                for k in 0..kdim {
                    acc += A[(i, k)] * B[(k, j)];
                }
                let c = &mut self[(i, j)];
                *c = if β == T::zero() {
                    α * acc
                } else {
                    α * acc + β * (*c)
                };
            }
        }
        self
    }
}

#[test]
fn test_gemm() {
    #[rustfmt::skip]
    let A = Matrix::from(&[
        [1., 2., 3.],
        [4., 5., 6.]]);

    #[rustfmt::skip]
    let B = Matrix::from(&[
        [1., 2.],
        [3., 4.],
        [5., 6.]]);

    let mut C = Matrix::<f64>::identity(2);
    C.mul(&A, &B, 1.0, 2.0);

    #[rustfmt::skip]
    let Cref = Matrix::from(&[
        [24., 28.],
        [49., 66.]]);

    assert_eq!(C, Cref);

    // A'*A through an adjoint view
    let mut D = Matrix::<f64>::zeros((3, 3));
    D.mul(&A.t(), &A, 1.0, 0.0);
    assert_eq!(D[(0, 0)], 17.);
    assert_eq!(D[(2, 1)], 36.);
    assert_eq!(D[(1, 2)], 36.);
}
