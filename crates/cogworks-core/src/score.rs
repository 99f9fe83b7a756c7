//! Score payloads and the run-level accumulator.
//!
//! Every object carries a three-field payload: a base point value, an
//! additive multiplier term, and a multiplicative multiplier term. The
//! multiplier terms use Q32.32 fixed-point so that folding them is
//! deterministic across platforms.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Deterministic
/// multiplier arithmetic; never use floats in the simulation.
pub type Fixed64 = I32F32;

// ---------------------------------------------------------------------------
// Score payload
// ---------------------------------------------------------------------------

/// The `{base, mult_add, mult_mult}` triple carried by an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePayload {
    /// Additive point total.
    pub base: i64,
    /// Additive multiplier term.
    pub mult_add: Fixed64,
    /// Multiplicative multiplier term.
    pub mult_mult: Fixed64,
}

impl ScorePayload {
    /// A payload with the given base value and neutral multiplier terms.
    pub fn new(base: i64) -> Self {
        Self {
            base,
            mult_add: Fixed64::ZERO,
            mult_mult: Fixed64::from_num(1),
        }
    }

    /// The payload a freshly mined object carries: one point, neutral
    /// multipliers.
    pub fn unit() -> Self {
        Self::new(1)
    }

    /// Combine two payloads: bases add, additive terms add, multiplicative
    /// terms **multiply**. The asymmetry is deliberate -- stacking
    /// multiplicative synergy beats simple addition and must be preserved.
    ///
    /// All arithmetic saturates: a value cycling through upgraders until the
    /// safety limit clamps at the numeric ceiling instead of overflowing.
    pub fn combine(&self, other: &ScorePayload) -> Self {
        Self {
            base: self.base.saturating_add(other.base),
            mult_add: self.mult_add.saturating_add(other.mult_add),
            mult_mult: self.mult_mult.saturating_mul(other.mult_mult),
        }
    }

    /// Half the base value, floored, never below 1. Multiplier terms are
    /// kept unchanged -- both halves of a split retain the parent's terms.
    pub fn halved(&self) -> Self {
        Self {
            base: (self.base / 2).max(1),
            ..*self
        }
    }
}

// ---------------------------------------------------------------------------
// Run accumulator
// ---------------------------------------------------------------------------

/// Folds the payloads attached to a run's consumption changes into a single
/// total, using the same combine rule objects use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunScore {
    folded: ScorePayload,
}

impl RunScore {
    /// An empty accumulator: zero base, neutral multipliers.
    pub fn new() -> Self {
        Self {
            folded: ScorePayload::new(0),
        }
    }

    /// Absorb one change payload.
    pub fn absorb(&mut self, payload: &ScorePayload) {
        self.folded = self.folded.combine(payload);
    }

    /// The folded payload (base total plus multiplier terms).
    pub fn folded(&self) -> &ScorePayload {
        &self.folded
    }

    /// Settle to a final integer score: `base * (1 + mult_add) * mult_mult`,
    /// truncated toward zero. Saturates at the Q32.32 range; bases beyond
    /// 2^31 (reachable with a long enough amplifier chain) clamp rather than
    /// panic on conversion.
    pub fn settled(&self) -> i64 {
        let one = Fixed64::from_num(1);
        let total = Fixed64::saturating_from_num(self.folded.base)
            .saturating_mul(one.saturating_add(self.folded.mult_add))
            .saturating_mul(self.folded.mult_mult);
        total.to_num()
    }
}

impl Default for RunScore {
    fn default() -> Self {
        Self::new()
    }
}
