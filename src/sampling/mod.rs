//! Point samplers for the unit square and the circle-area benchmark.
//!
//! Three strategies are compared for how evenly they cover a 2-D parameter
//! space:
//!
//! - uniform pseudo-random points (`UniformSampler`)
//! - Latin Hypercube Sampling (`LatinHypercube`)
//! - the 2-D Sobol low-discrepancy sequence (`Sobol2d`)

pub mod circle;
pub mod lhs;
pub mod sobol;
pub mod uniform;

pub use circle::*;
pub use lhs::LatinHypercube;
pub use sobol::Sobol2d;
pub use uniform::UniformSampler;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A point in `[0, 1)^2`.
pub type Point2 = [f64; 2];

/// Produces batches of points in the unit square.
pub trait PointSampler {
    /// Draw `n` points.
    ///
    /// For stratified methods the batch is the design: calling twice gives two
    /// independent designs, not one design of size `2n`.
    fn sample(&mut self, n: usize) -> Vec<Point2>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethod {
    Uniform,
    Lhs,
    Sobol,
}

impl SamplingMethod {
    pub const ALL: [SamplingMethod; 3] = [SamplingMethod::Uniform, SamplingMethod::Lhs, SamplingMethod::Sobol];

    pub fn display_name(self) -> &'static str {
        match self {
            SamplingMethod::Uniform => "uniform",
            SamplingMethod::Lhs => "lhs",
            SamplingMethod::Sobol => "sobol",
        }
    }

    /// Build a sampler for this method.
    ///
    /// With `scramble == false` the Sobol sampler is the plain deterministic
    /// sequence; otherwise it gets a random digital shift derived from `seed`.
    /// `sobol_skip` leading Sobol points are dropped; other methods ignore it.
    pub fn sampler(self, seed: u64, scramble: bool, sobol_skip: u64) -> Box<dyn PointSampler + Send> {
        match self {
            SamplingMethod::Uniform => Box::new(UniformSampler::new(seed)),
            SamplingMethod::Lhs => Box::new(LatinHypercube::new(seed)),
            SamplingMethod::Sobol => {
                let mut sobol = if scramble { Sobol2d::scrambled(seed) } else { Sobol2d::new() };
                sobol.skip(sobol_skip);
                Box::new(sobol)
            }
        }
    }
}
