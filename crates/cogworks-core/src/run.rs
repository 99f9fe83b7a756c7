//! The run simulator: resolves a full run, tick by tick, to completion.
//!
//! One call computes the entire tick history before returning -- no internal
//! suspension points, no locking, no shared state. The board is read-only
//! for the duration of the call; all working state (`history`, the change
//! list) is owned exclusively by the simulation.

use crate::board::Board;
use crate::change::{self, Change};
use crate::object::Object;
use crate::score::RunScore;
use serde::{Deserialize, Serialize};

/// Safety bound on run length. A placement that never reaches steady state
/// (e.g. a closed conveyor loop) is cut off here; exhaustion is a placement
/// anomaly reported through [`RunOutcome::limit_reached`], not an error.
pub const TICK_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// One entry per resolved tick, each the full list of changes committed
    /// that tick. The auditable, replayable record of the run.
    pub ticks: Vec<Vec<Change>>,

    /// Object-set snapshots, one per tick plus the seeded initial entry.
    /// Always exactly one longer than `ticks`.
    pub history: Vec<Vec<Object>>,

    /// True when the run was cut off at [`TICK_LIMIT`] instead of reaching
    /// steady state. The partial change list is still returned in full.
    pub limit_reached: bool,
}

impl RunOutcome {
    /// Fold every change payload in the run into a score accumulator.
    pub fn score(&self) -> RunScore {
        let mut total = RunScore::new();
        for change in self.ticks.iter().flatten() {
            if let Some(payload) = &change.score {
                total.absorb(payload);
            }
        }
        total
    }

    /// Number of resolved ticks.
    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Simulate a full run starting from an empty object set.
pub fn simulate(board: &Board) -> RunOutcome {
    simulate_seeded(board, Vec::new())
}

/// Simulate a full run starting from a caller-provided object set (resuming
/// mid-run scenarios, tests).
///
/// Per tick: every placed machine is invoked once, in ascending cell order,
/// against the frozen latest snapshot; the collected changes are committed
/// atomically to form the next snapshot. The run ends on the first tick that
/// produces no changes -- the sole termination condition besides the safety
/// limit.
pub fn simulate_seeded(board: &Board, seed: Vec<Object>) -> RunOutcome {
    let grid = board.config();
    let mut history = vec![seed];
    let mut ticks: Vec<Vec<Change>> = Vec::new();
    let mut limit_reached = true;

    for tick in 0..TICK_LIMIT {
        let mut tick_changes: Vec<Change> = Vec::new();
        for (cell, state) in board.iter_placed() {
            tick_changes.extend(state.machine.process(
                cell,
                &history,
                tick,
                state.orientation,
                grid,
            ));
        }

        if tick_changes.is_empty() {
            limit_reached = false;
            break;
        }

        let next = change::apply_tick(&tick_changes);
        history.push(next);
        ticks.push(tick_changes);
    }

    RunOutcome {
        ticks,
        history,
        limit_reached,
    }
}
