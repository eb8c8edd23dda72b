//! Data sources.
//!
//! - `synthetic`: demo exogenous inputs and noisy observed series generated
//!   from known parameters

pub mod synthetic;

pub use synthetic::*;
