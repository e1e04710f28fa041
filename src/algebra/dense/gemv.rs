#![allow(non_snake_case)]

use crate::algebra::{Adjoint, DenseMatrix, FloatT, Matrix, MultiplyGEMV, ShapedMatrix};

impl<T> MultiplyGEMV for Matrix<T>
where
    T: FloatT,
{
    type T = T;
    // implements y = αA*x + βy
    fn gemv(&self, x: &[T], y: &mut [T], α: T, β: T) {
        let (m, n) = self.size();
        assert!(n == x.len() && m == y.len());

        if β == T::zero() {
            y.iter_mut().for_each(|v| *v = T::zero());
        } else if β != T::one() {
            y.iter_mut().for_each(|v| *v *= β);
        }

        for (j, &xj) in x.iter().enumerate() {
            let c = α * xj;
            if c == T::zero() {
                continue;
            }
            for (yi, &aij) in y.iter_mut().zip(self.col_slice(j)) {
                *yi += c * aij;
            }
        }
    }
}

impl<'a, T> MultiplyGEMV for Adjoint<'a, Matrix<T>>
where
    T: FloatT,
{
    type T = T;
    // implements y = αA'*x + βy
    fn gemv(&self, x: &[T], y: &mut [T], α: T, β: T) {
        let (m, n) = self.src.size(); //NB: size of A, not A'
        assert!(m == x.len() && n == y.len());

        for (j, yj) in y.iter_mut().enumerate() {
            let col = self.src.col_slice(j);
            let dot = col.iter().zip(x).fold(T::zero(), |acc, (&a, &x)| acc + a * x);
            *yj = if β == T::zero() {
                α * dot
            } else {
                α * dot + β * (*yj)
            };
        }
        debug_assert!(self.data().len() == m * n);
    }
}

#[test]
fn test_gemv() {
    let (m, n) = (2, 3);
    let a = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
    let A = Matrix::new_from_slice((m, n), &a);

    let x = vec![1., 2., 3.];
    let mut y = vec![-1., -2.];
    A.gemv(&x, &mut y, 2.0, 3.0);
    assert!(y == [25.0, 58.0]);

    let x = vec![1., 2.];
    let mut y = vec![-1., -2., -3.];
    A.t().gemv(&x, &mut y, 2.0, 3.0);
    assert!(y == [15.0, 18.0, 21.0]);
}

#[test]
fn test_gemv_ignores_stale_output() {
    let A = Matrix::<f64>::identity(2);
    let mut y = vec![f64::NAN, f64::NAN];
    A.gemv(&[1., 2.], &mut y, 1.0, 0.0);
    assert!(y == [1.0, 2.0]);
}
