//! Latin Hypercube Sampling in two dimensions.
//!
//! Each axis is cut into `n` equal strata. Every stratum of every axis holds
//! exactly one point; strata are paired across axes by an independent random
//! permutation, and each point is jittered uniformly inside its cell.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{Point2, PointSampler};

#[derive(Debug, Clone)]
pub struct LatinHypercube {
    rng: StdRng,
}

impl LatinHypercube {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn axis(&mut self, n: usize) -> Vec<f64> {
        let mut strata: Vec<usize> = (0..n).collect();
        strata.shuffle(&mut self.rng);
        let width = 1.0 / n as f64;
        strata
            .into_iter()
            .map(|k| (k as f64 + self.rng.gen_range(0.0..1.0)) * width)
            .collect()
    }
}

impl PointSampler for LatinHypercube {
    fn sample(&mut self, n: usize) -> Vec<Point2> {
        if n == 0 {
            return Vec::new();
        }
        let xs = self.axis(n);
        let ys = self.axis(n);
        xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect()
    }
}
