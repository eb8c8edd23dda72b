//! Simulation of the workload model over a fixed horizon.

pub mod euler;

pub use euler::*;
