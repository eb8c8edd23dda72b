//! Mathematical utilities: interpolation of exogenous series and least squares.

pub mod interp;
pub mod ols;

pub use interp::*;
pub use ols::*;
