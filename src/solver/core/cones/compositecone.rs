use super::*;
use std::collections::TryReserveError;
use std::iter::zip;
use std::ops::Range;

// -------------------------------------
// composite cone type
// -------------------------------------

/// The ordered collection of cones for the constraints of one storage slot.
/// Constraint `i` occupies the index range `rng_cones[i]` of the stacked
/// constraint vector.
#[derive(Debug)]
pub struct CompositeCone<T: FloatT = f64> {
    cones: Vec<SupportedCone<T>>,

    //overall size of the composite cone
    pub(crate) numel: usize,

    //ranges for the indices of the constituent cones
    pub(crate) rng_cones: Vec<Range<usize>>,
}

impl<T> CompositeCone<T>
where
    T: FloatT,
{
    pub fn try_new(types: &[SupportedConeT]) -> Result<Self, TryReserveError> {
        let ncones = types.len();

        let mut cones: Vec<SupportedCone<T>> = Vec::new();
        cones.try_reserve_exact(ncones)?;
        cones.extend(types.iter().map(make_cone));

        let numel = cones
            .iter()
            .fold(0, |acc: usize, c| acc.saturating_add(c.numel()));

        let mut rng_cones = Vec::new();
        rng_cones.try_reserve_exact(ncones)?;
        let mut start = 0;
        for cone in cones.iter() {
            let stop = start + cone.numel();
            rng_cones.push(start..stop);
            start = stop;
        }

        Ok(Self {
            cones,
            numel,
            rng_cones,
        })
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, SupportedCone<T>> {
        self.cones.iter()
    }
}

impl<T> Cone<T> for CompositeCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.numel
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn project(&self, x: &mut [T]) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            cone.project(&mut x[rng.clone()]);
        }
    }

    fn polar_distance(&self, x: &[T]) -> T {
        zip(&self.cones, &self.rng_cones).fold(T::zero(), |acc, (cone, rng)| {
            T::max(acc, cone.polar_distance(&x[rng.clone()]))
        })
    }

    fn contains(&self, x: &[T], tol: T) -> bool {
        zip(&self.cones, &self.rng_cones).all(|(cone, rng)| cone.contains(&x[rng.clone()], tol))
    }
}

#[test]
fn test_composite_cone_blocks() {
    use crate::algebra::VectorMath;

    let types = [
        SupportedConeT::ZeroConeT(1),
        SupportedConeT::NegativeOrthantConeT(2),
        SupportedConeT::SecondOrderConeT(3),
    ];
    let K = CompositeCone::<f64>::try_new(&types).unwrap();
    assert_eq!(K.len(), 3);
    assert_eq!(K.numel(), 6);
    assert_eq!(K.rng_cones[2], 3..6);
    assert!(matches!(K.iter().nth(1), Some(SupportedCone::NegativeOrthantCone(_))));

    let mut x = vec![4., 1., -1., 0., 3., 4.];
    K.project(&mut x);
    assert!(x.norm_inf_diff(&[0., 0., -1., 2.5, 1.5, 2.]) < 1e-14);
    assert!(K.contains(&x, 1e-12));
    assert_eq!(K.polar_distance(&[0., 1., 1., -5., 3., 4.]), 0.);
}
