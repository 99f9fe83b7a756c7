//! Objects: the units traveling through the factory.

use crate::effect::Effect;
use crate::grid::CellIndex;
use crate::score::ScorePayload;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Object kind
// ---------------------------------------------------------------------------

/// The color/type tag of an object. Three values, cyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Red,
    Green,
    Blue,
}

impl ObjectKind {
    /// Advance one step in the fixed cycle Red -> Green -> Blue -> Red.
    pub fn next(self) -> Self {
        match self {
            ObjectKind::Red => ObjectKind::Green,
            ObjectKind::Green => ObjectKind::Blue,
            ObjectKind::Blue => ObjectKind::Red,
        }
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// An object in flight. Objects have no persistent identity across ticks;
/// within one tick an object is identified by its cell in the current
/// snapshot, and continuity across ticks is reconstructed from each change's
/// start/end linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub cell: CellIndex,
    pub kind: ObjectKind,
    pub score: ScorePayload,
    /// Active effects attached to this object. Reserved for effect-carrying
    /// objects; the stock machine catalogue never populates it.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Object {
    /// A fresh object with the unit payload (as emitted by a miner).
    pub fn new(cell: CellIndex, kind: ObjectKind) -> Self {
        Self::with_score(cell, kind, ScorePayload::unit())
    }

    /// An object carrying a specific payload.
    pub fn with_score(cell: CellIndex, kind: ObjectKind, score: ScorePayload) -> Self {
        Self {
            cell,
            kind,
            score,
            effects: Vec::new(),
        }
    }
}
