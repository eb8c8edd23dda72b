//! Two-dimensional Sobol sequence.
//!
//! Dimension 1 is the van der Corput sequence in base 2; dimension 2 uses the
//! primitive polynomial `x + 1` with initial direction number `m1 = 1`.
//! Points are produced in Gray-code order, so each new point costs one XOR
//! per dimension:
//!
//! ```text
//! x[n+1] = x[n] ^ v[c],  c = index of the lowest zero bit of n
//! ```
//!
//! An optional random digital shift (XOR with a fixed random word per
//! dimension) scrambles the sequence while keeping its stratification.

use rand::prelude::*;
use rand::rngs::StdRng;

use super::{Point2, PointSampler};

const BITS: usize = 32;
const SCALE: f64 = 1.0 / 4_294_967_296.0; // 2^-32

fn direction_numbers() -> [[u32; BITS]; 2] {
    let mut v = [[0u32; BITS]; 2];
    for k in 0..BITS {
        v[0][k] = 1u32 << (BITS - 1 - k);
    }
    v[1][0] = 1u32 << (BITS - 1);
    for k in 1..BITS {
        v[1][k] = v[1][k - 1] ^ (v[1][k - 1] >> 1);
    }
    v
}

#[derive(Debug, Clone)]
pub struct Sobol2d {
    directions: [[u32; BITS]; 2],
    state: [u32; 2],
    shift: [u32; 2],
    /// Index of the next point to emit.
    index: u64,
}

impl Sobol2d {
    /// The plain sequence, starting at the origin.
    pub fn new() -> Self {
        Self {
            directions: direction_numbers(),
            state: [0, 0],
            shift: [0, 0],
            index: 0,
        }
    }

    /// The sequence XOR-shifted by random words drawn from `seed`.
    pub fn scrambled(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            shift: [rng.next_u32(), rng.next_u32()],
            ..Self::new()
        }
    }

    /// Drop the next `n` points (e.g. the leading origin).
    pub fn skip(&mut self, n: u64) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub fn next_point(&mut self) -> Point2 {
        let point = [
            (self.state[0] ^ self.shift[0]) as f64 * SCALE,
            (self.state[1] ^ self.shift[1]) as f64 * SCALE,
        ];
        self.advance();
        point
    }

    fn advance(&mut self) {
        let c = (self.index.trailing_ones() as usize).min(BITS - 1);
        self.state[0] ^= self.directions[0][c];
        self.state[1] ^= self.directions[1][c];
        self.index += 1;
    }
}

impl Default for Sobol2d {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSampler for Sobol2d {
    /// Continues the sequence; a fresh sampler starts at index 0.
    fn sample(&mut self, n: usize) -> Vec<Point2> {
        (0..n).map(|_| self.next_point()).collect()
    }
}
