//! Model calibration.
//!
//! Responsibilities:
//!
//! - build the parameter grid (linear for alpha/tpod0, log for time constants)
//! - score each candidate against observed TPOD (parallel)
//! - select the best candidate deterministically
//! - optionally polish it with Gauss-Newton

pub mod calibrate;
pub mod grid;
pub mod refine;

pub use calibrate::*;
pub use grid::*;
pub use refine::Refinement;
