//! Hierarchical timers for profiling solver phases.

mod timers;
pub use timers::*;
pub(crate) use timers::{notimeit, timeit};
