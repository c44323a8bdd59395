//! Homogeneous participating media for Monte Carlo light transport.

pub mod core;
pub mod loader;
pub mod medium;
pub mod phase;
pub mod probe;
