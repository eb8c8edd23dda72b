//! Independent uniform pseudo-random points.

use rand::prelude::*;
use rand::rngs::StdRng;

use super::{Point2, PointSampler};

#[derive(Debug, Clone)]
pub struct UniformSampler {
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PointSampler for UniformSampler {
    fn sample(&mut self, n: usize) -> Vec<Point2> {
        (0..n)
            .map(|_| [self.rng.gen_range(0.0..1.0), self.rng.gen_range(0.0..1.0)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_stay_in_unit_square() {
        let pts = UniformSampler::new(7).sample(1000);
        assert_eq!(pts.len(), 1000);
        assert!(pts.iter().flatten().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn same_seed_same_points() {
        assert_eq!(UniformSampler::new(3).sample(10), UniformSampler::new(3).sample(10));
        assert_ne!(UniformSampler::new(3).sample(10), UniformSampler::new(4).sample(10));
    }
}
