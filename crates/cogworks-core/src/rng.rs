//! Deterministic PRNG for gameplay randomness outside the simulator.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable. The run simulator
//! itself takes no randomness; this exists for the surrounding session loop
//! (collector relocation between runs), keeping whole sessions replayable
//! from a seed.

use serde::{Deserialize, Serialize};

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// A uniform-enough value in `0..bound`. Returns 0 for `bound == 0`.
    ///
    /// Plain modulo; the bias is negligible at gameplay bounds (tens of
    /// cells against a 64-bit range).
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    /// A random index into a collection of `len` elements, or `None` when
    /// empty.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_below(len as u64) as usize)
    }

    /// The internal state (for snapshots).
    pub fn state(&self) -> u64 {
        self.state
    }
}
