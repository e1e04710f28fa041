#![allow(non_snake_case)]

mod cholesky;
mod core;
mod gemm;
mod gemv;
mod types;

pub use self::core::*;
pub use cholesky::*;
pub use types::*;
