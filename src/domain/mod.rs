//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model parameter vector (`Params`) and labelled sources (`ParamSource`)
//! - the integration horizon (`Horizon`)
//! - observed weekly records (`ObservedRecord`)
//! - simulation outputs (`Trajectory`, `SourceRun`, `TrajectoryFile`)
//! - run configurations derived from CLI flags

pub mod types;

pub use types::*;
