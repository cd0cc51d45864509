//! Seeded random number generation.
//!
//! The simulation never reads system randomness. World generation and unit
//! spawn positions draw from a [`SimRng`] owned by the simulation, so the
//! same seed always yields the same game.

use crate::math::Fixed;

/// Simple deterministic linear congruential generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a generator from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Advance the generator and return the raw 64-bit state.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform integer in `0..bound`. Returns 0 when `bound` is 0.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // High bits of an LCG are far better distributed than the low ones.
        let high = (self.next_u64() >> 32) as u32;
        ((u64::from(high) * u64::from(bound)) >> 32) as u32
    }

    /// Uniform fixed-point value in `[0, 1)`.
    pub fn next_unit(&mut self) -> Fixed {
        let high = self.next_u64() >> 32;
        Fixed::from_bits(high as i64)
    }
}
