//! Timed effects propagated between neighboring machines.
//!
//! Effects are orthogonal to the tick loop: machines emit them once per
//! placement/refresh event (never per simulation tick), and whichever loop
//! matches an effect's duration unit is responsible for decrementing it --
//! tick-scoped effects on every animated tick, run/round-scoped effects on
//! run/round boundaries.

use crate::grid::CellIndex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Effect kinds and durations
// ---------------------------------------------------------------------------

/// What an effect does to its host machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Speeds up the host (emitted by boosters).
    BuffSpeed,
    /// Improves the host's efficiency (emitted by catalysts).
    BuffEfficiency,
    /// Boosts a producer's output value (emitted by amplifiers).
    AmplifyValue,
}

/// The unit an effect's duration is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Ticks,
    Runs,
    Rounds,
}

/// A timed modifier attached to a machine placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Remaining duration, in `unit`s. Zero means expired.
    pub remaining: u32,
    pub unit: DurationUnit,
}

impl Effect {
    pub fn new(kind: EffectKind, remaining: u32, unit: DurationUnit) -> Self {
        Self {
            kind,
            remaining,
            unit,
        }
    }

    pub fn expired(&self) -> bool {
        self.remaining == 0
    }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// An effect aimed at a neighboring cell, produced by a machine's emission
/// scan. The board attaches it to whatever machine occupies `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEmission {
    pub target: CellIndex,
    pub effect: Effect,
}

// ---------------------------------------------------------------------------
// Expiry pass
// ---------------------------------------------------------------------------

/// Decrement every effect counted in `unit` by one elapsed unit and drop the
/// ones that expire. Effects counted in other units are untouched.
pub fn expire_elapsed(effects: &mut Vec<Effect>, unit: DurationUnit) {
    for effect in effects.iter_mut() {
        if effect.unit == unit {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
    }
    effects.retain(|e| !e.expired());
}
