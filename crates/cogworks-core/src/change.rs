//! The change/apply protocol: atomic per-tick mutation records.
//!
//! A change names a start object (consumed) and/or an end object (produced),
//! optionally carrying a score payload for the caller to bank. Machines only
//! ever *describe* mutations; a single apply step commits one tick's worth
//! of changes atomically. This is what resolves many machines acting on
//! shared cells in the same tick: everyone reads the same frozen snapshot.

use crate::object::Object;
use crate::score::ScorePayload;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// One atomic mutation for one tick.
///
/// - `start: None, end: Some` -- emission (a producer created an object).
/// - `start: Some, end: None` -- consumption; `score` carries the banked
///   payload when the consumer scores it.
/// - both `Some` -- a move/transform of one object into another, possibly at
///   a different cell with a different kind or payload.
///
/// Two changes sharing the same start object model duplication: the splitter
/// emits two end objects from one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub start: Option<Object>,
    pub end: Option<Object>,
    /// Payload for the caller to accumulate into run totals. Attached only
    /// by scoring consumers; plain deletions leave it empty.
    pub score: Option<ScorePayload>,
}

impl Change {
    /// A producer emission: no start, one new end object.
    pub fn emission(end: Object) -> Self {
        Self {
            start: None,
            end: Some(end),
            score: None,
        }
    }

    /// A move/transform: `start` becomes `end`.
    pub fn transfer(start: Object, end: Object) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            score: None,
        }
    }

    /// A deletion, optionally banking a payload.
    pub fn despawn(start: Object, score: Option<ScorePayload>) -> Self {
        Self {
            start: Some(start),
            end: None,
            score,
        }
    }

    pub fn is_emission(&self) -> bool {
        self.start.is_none() && self.end.is_some()
    }

    pub fn is_despawn(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    pub fn is_transfer(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Commit one tick's changes: the next snapshot is exactly the end objects,
/// in change order. Nil-end changes contribute nothing, which is how
/// consumption removes an object from play.
///
/// Order matters downstream: "first object found" tie-breaks in machine
/// behavior iterate the snapshot in this order.
pub fn apply_tick(changes: &[Change]) -> Vec<Object> {
    changes.iter().filter_map(|c| c.end.clone()).collect()
}
