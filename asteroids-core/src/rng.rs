//! Xorshift32 generator shared by every random draw in the simulation.
//!
//! Algorithm: x ^= x << 13; x ^= x >> 17; x ^= x << 5;
//! Float draws take the top 24 bits so every value is exactly representable.

use core::f32::consts::TAU;

use crate::geometry::Vec2;

const UNIT_SCALE: f32 = 1.0 / (1u32 << 24) as f32;

#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    /// Uniform value in [0, 1).
    pub fn unit(&mut self) -> f32 {
        (self.next() >> 8) as f32 * UNIT_SCALE
    }

    /// Uniform value between `min` and `max`. The bounds may be given in either order.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    pub fn coin_flip(&mut self) -> bool {
        self.unit() > 0.5
    }

    /// Magnitude in [min, max) with a random sign.
    pub fn signed_range(&mut self, min: f32, max: f32) -> f32 {
        let magnitude = self.range(min, max);
        if self.coin_flip() {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Point inside the unit circle, denser towards the rim like a triangular radius draw.
    pub fn point_in_circle(&mut self) -> Vec2 {
        let angle = self.range(0.0, TAU);
        let u = self.unit() + self.unit();
        let radius = if u > 1.0 { 2.0 - u } else { u };
        Vec2::new(radius * angle.cos(), radius * angle.sin())
    }
}
