use super::*;
use crate::algebra::*;
use core::marker::PhantomData;

// -------------------------------------
// Negative Orthant
// -------------------------------------

/// The set `{x : x ≤ 0}`, used to express inequality constraints.
#[derive(Debug)]
pub struct NegativeOrthantCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> NegativeOrthantCone<T>
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

impl<T> Cone<T> for NegativeOrthantCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn numel(&self) -> usize {
        self.dim
    }

    fn project(&self, x: &mut [T]) {
        x.scalarop(|v| T::min(v, T::zero()));
    }

    fn polar_distance(&self, x: &[T]) -> T {
        // polar is the nonnegative orthant
        let d2 = x
            .iter()
            .fold(T::zero(), |acc, &v| acc + T::powi(T::min(v, T::zero()), 2));
        d2.sqrt()
    }

    fn contains(&self, x: &[T], tol: T) -> bool {
        x.iter().all(|&v| v <= tol)
    }
}

#[test]
fn test_negative_orthant_projection() {
    let K = NegativeOrthantCone::<f64>::new(4);
    let mut x = vec![1., -2., 0., 3.5];
    K.project(&mut x);
    assert_eq!(x, vec![0., -2., 0., 0.]);
    assert!(K.contains(&x, 0.));

    // fixed point
    let y = x.clone();
    K.project(&mut x);
    assert_eq!(x, y);

    assert_eq!(K.polar_distance(&[1., 2.]), 0.);
    assert_eq!(K.polar_distance(&[-3., 2., -4.]), 5.);
}
