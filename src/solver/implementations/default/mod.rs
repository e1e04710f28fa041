#![allow(non_snake_case)]

mod data_updating;
mod info;
mod info_print;
mod kktsystem;
mod problemdata;
mod residuals;
mod settings;
mod shift;
mod solver;
mod variables;

//export flattened
pub use info::*;
pub use info_print::*;
pub use kktsystem::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solver::*;
pub use variables::*;
