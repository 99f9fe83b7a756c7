//! Shared helpers for unit and integration tests.
//!
//! Available to downstream crates via the `test-utils` feature.

use crate::board::{Board, PlacementId};
use crate::grid::{CellIndex, GridConfig, Orientation};
use crate::machine::Machine;
use crate::object::{Object, ObjectKind};
use crate::score::{Fixed64, ScorePayload};

/// A board with the default 9x9 grid (7x7 interactive).
pub fn board() -> Board {
    Board::new(GridConfig::default())
}

/// Place a machine by row and column, panicking on rejection.
pub fn place(
    board: &mut Board,
    row: i32,
    col: i32,
    machine: Machine,
    orientation: Orientation,
) -> PlacementId {
    let cell = board.config().cell(row, col);
    match board.place(cell, machine, orientation, 0) {
        Ok(id) => id,
        Err(e) => panic!("placement at ({row}, {col}) rejected: {e}"),
    }
}

/// A score payload from integer parts.
pub fn payload(base: i64, mult_add: i64, mult_mult: i64) -> ScorePayload {
    ScorePayload {
        base,
        mult_add: Fixed64::from_num(mult_add),
        mult_mult: Fixed64::from_num(mult_mult),
    }
}

/// An object carrying the given payload, addressed by row and column.
pub fn object_at(
    grid: &GridConfig,
    row: i32,
    col: i32,
    kind: ObjectKind,
    score: ScorePayload,
) -> Object {
    Object::with_score(grid.cell(row, col), kind, score)
}

/// Cell index by row and column on the default grid.
pub fn cell(row: i32, col: i32) -> CellIndex {
    GridConfig::default().cell(row, col)
}
