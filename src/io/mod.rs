//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - CSV exports of trajectories, params and benchmark rows (`export`)
//! - run JSON read/write (`run_file`)

pub mod export;
pub mod ingest;
pub mod run_file;

pub use export::*;
pub use ingest::*;
pub use run_file::*;
