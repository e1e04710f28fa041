//! Linear algebra for the solver: floating point traits, vector operations
//! on slices and a small dense column-major matrix type with native
//! matrix-vector, matrix-matrix and Cholesky routines.

#![allow(non_snake_case)]

mod dense;
mod error_types;
mod floats;
mod math_traits;
mod scalarmath;
mod vecmath;

pub use dense::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use vecmath::try_zeros;
