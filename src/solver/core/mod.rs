// package together all of the following and re-export
// in a partially flattened structure :
// : core component traits
// : cone traits and standard cone implementations
// : storage slot indirection
// : errors and settings
// : main solver loop

pub mod cones;
pub mod storage;
pub mod traits;

//partially flatten top level pieces

mod errors;
mod settings;
mod solver;
pub use errors::*;
pub use settings::*;
pub use solver::*;
