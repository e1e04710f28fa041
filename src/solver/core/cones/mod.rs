#![allow(non_snake_case)]

use crate::algebra::FloatT;
use enum_dispatch::*;

//primitive cone types
mod negativeorthant;
mod socone;
mod zerocone;

//the supported cone wrapper type for primitives
//and the composite cone
mod compositecone;
mod supportedcone;

//flatten all cone implementations to appear in this module
pub use compositecone::*;
pub use negativeorthant::*;
pub use socone::*;
pub use supportedcone::*;
pub use zerocone::*;

#[enum_dispatch]
pub trait Cone<T>
where
    T: FloatT,
{
    // functions relating to basic sizing
    fn dim(&self) -> usize;
    fn numel(&self) -> usize;

    /// Euclidean projection onto the cone, in place
    fn project(&self, x: &mut [T]);

    /// Euclidean distance of `x` from the polar cone
    fn polar_distance(&self, x: &[T]) -> T;

    /// Membership test with tolerance `tol`
    fn contains(&self, x: &[T], tol: T) -> bool;
}
