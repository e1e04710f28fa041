use super::Cone;
use crate::algebra::*;
use core::marker::PhantomData;

// -------------------------------------
// Second order Cone
// -------------------------------------

/// The set `{(t,v) : ‖v‖ ≤ t}`.  The first element is the scalar `t`.
#[derive(Debug)]
pub struct SecondOrderCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> SecondOrderCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 1);
        Self {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<T> Cone<T> for SecondOrderCone<T>
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
        let t = x[0];
        let v = &mut x[1..];
        let nv = v.norm();

        if nv <= t {
            return;
        }
        if nv <= -t {
            x.set(T::zero());
            return;
        }

        let two: T = (2.).as_T();
        let tnew = (nv + t) / two;
        v.scale(tnew / nv);
        x[0] = tnew;
    }

    fn polar_distance(&self, x: &[T]) -> T {
        // polar cone is {(t,v) : ‖v‖ ≤ -t}
        let t = x[0];
        let nv = x[1..].norm();

        if nv <= -t {
            T::zero()
        } else if nv <= t {
            x.norm()
        } else {
            (nv + t) / T::SQRT_2()
        }
    }

    fn contains(&self, x: &[T], tol: T) -> bool {
        x[1..].norm() <= x[0] + tol
    }
}

// ---------------------------------------------
// SOC specific tests
// ---------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soc_projection_values() {
        let K = SecondOrderCone::<f64>::new(3);

        // ‖v‖ ≤ -t projects to the origin
        let mut x = vec![-10., 3., 4.];
        K.project(&mut x);
        assert_eq!(x, vec![0., 0., 0.]);

        // already feasible
        let mut x = vec![10., 3., 4.];
        K.project(&mut x);
        assert_eq!(x, vec![10., 3., 4.]);

        // scaled onto the boundary
        let mut x = vec![0., 3., 4.];
        K.project(&mut x);
        assert!(x.norm_inf_diff(&[2.5, 1.5, 2.]) < 1e-14);
    }

    #[test]
    fn test_soc_projection_idempotent() {
        let K = SecondOrderCone::<f64>::new(3);

        let mut x = vec![1., 7., -2.];
        K.project(&mut x);
        assert!(K.contains(&x, 1e-12));
        let y = x.clone();
        K.project(&mut x);
        assert!(x.norm_inf_diff(&y) < 1e-14);

        // boundary points are fixed points
        let mut b = vec![5., 3., 4.];
        K.project(&mut b);
        assert_eq!(b, vec![5., 3., 4.]);
    }

    #[test]
    fn test_soc_polar_distance() {
        let K = SecondOrderCone::<f64>::new(3);
        assert_eq!(K.polar_distance(&[-5., 3., 4.]), 0.);
        assert_eq!(K.polar_distance(&[5., 0., 0.]), 5.);
        let d = K.polar_distance(&[0., 3., 4.]);
        assert!((d - 5. / f64::sqrt(2.)).abs() < 1e-14);
    }

    #[test]
    fn test_soc_single_precision() {
        let K = SecondOrderCone::<f32>::new(3);
        let mut x = vec![0f32, 3., 4.];
        K.project(&mut x);
        assert!(x.norm_inf_diff(&[2.5, 1.5, 2.]) < 1e-6);
    }
}
