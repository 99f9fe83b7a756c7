//! Cogworks Core -- the run simulation engine for a grid-based factory
//! puzzle game.
//!
//! Players place directional machines on a grid; a *run* resolves machine
//! behavior tick by tick, producing an auditable sequence of per-tick
//! [`change::Change`] records. Colored objects are emitted by miners, moved
//! and transformed by belts and upgraders, merged, split, and finally
//! consumed by a collector that banks their score.
//!
//! # Change/Apply Protocol
//!
//! No machine ever mutates the grid directly. Each tick:
//!
//! 1. Every placed machine examines a **frozen snapshot** (the latest entry
//!    in the run history) and returns zero or more changes.
//! 2. The collected changes are committed **atomically**: every non-nil end
//!    object becomes part of the next snapshot, nil-end changes drop their
//!    start object.
//!
//! This makes per-tick resolution order immaterial for state correctness and
//! keeps runs fully deterministic: identical placements produce identical
//! change streams, byte for byte.
//!
//! # Key Types
//!
//! - [`run::simulate`] -- Resolve a full run; terminates on the first empty
//!   tick or at [`run::TICK_LIMIT`].
//! - [`machine::Machine`] -- The machine catalogue, dispatched by `match`.
//! - [`change::Change`] -- The atomic start/end mutation record.
//! - [`board::Board`] -- Placement storage: stable slotmap identities plus a
//!   dense cell index.
//! - [`effect::Effect`] -- Timed neighbor-propagated modifiers, expired by
//!   whichever loop matches their duration unit.
//! - [`record::RunRecord`] -- Versioned binary run record with replay
//!   verification.

pub mod background;
pub mod board;
pub mod change;
pub mod effect;
pub mod grid;
pub mod machine;
pub mod object;
pub mod record;
pub mod rng;
pub mod run;
pub mod score;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
