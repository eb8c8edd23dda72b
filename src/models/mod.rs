//! System-dynamics model equations.
//!
//! Models are implemented as small, pure functions so that the integrator and
//! the calibration code can stay generic.

pub mod workload;

pub use workload::*;
