use super::Cone;
use crate::algebra::*;
use core::marker::PhantomData;

// -------------------------------------
// Zero Cone
// -------------------------------------

/// The set `{0}`, used to express equality constraints.
#[derive(Debug)]
pub struct ZeroCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> ZeroCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<T> Cone<T> for ZeroCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn numel(&self) -> usize {
        self.dim()
    }

    fn project(&self, x: &mut [T]) {
        x.set(T::zero());
    }

    fn polar_distance(&self, _x: &[T]) -> T {
        // the polar of {0} is the whole space
        T::zero()
    }

    fn contains(&self, x: &[T], tol: T) -> bool {
        x.norm_inf() <= tol
    }
}

#[test]
fn test_zero_cone_projection() {
    let K = ZeroCone::<f64>::new(3);
    let mut x = vec![1., -2., 3.];
    K.project(&mut x);
    assert_eq!(x, vec![0.; 3]);

    // idempotent on its only member
    K.project(&mut x);
    assert_eq!(x, vec![0.; 3]);
    assert!(K.contains(&x, 0.));
    assert_eq!(K.polar_distance(&[5., -5., 1.]), 0.);
}
