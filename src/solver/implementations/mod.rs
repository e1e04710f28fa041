//! Implementations of the core solver traits.
//!
//! The [`default`] implementation stores dense per-step problem data in
//! storage slots and factors the KKT system with a Riccati recursion.

pub mod default;
