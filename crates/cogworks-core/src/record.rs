//! Versioned run records: serialize a run for audit, storage, and replay.
//!
//! A record captures everything needed to reproduce a run -- grid
//! configuration, placements, seed objects -- together with the change
//! stream the run actually produced. Encoding is binary via `bitcode` with
//! a magic/version header validated before decode results are trusted.
//! [`RunRecord::verify`] re-simulates from the captured inputs and compares
//! change streams, which is what makes the record an audit artifact rather
//! than just a save file.

use crate::board::{Board, PlaceError};
use crate::change::Change;
use crate::grid::{CellIndex, GridConfig, Orientation};
use crate::machine::Machine;
use crate::object::Object;
use crate::run::{self, RunOutcome};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a Cogworks run record.
pub const RECORD_MAGIC: u32 = 0xC0C5_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding a record.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur while decoding a record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", RECORD_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("record from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

/// Errors that can occur during replay verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The captured placements cannot be rebuilt into a board.
    #[error("recorded placement is invalid: {0}")]
    Placement(#[from] PlaceError),

    /// Re-simulation diverged from the recorded change stream.
    #[error("replay diverged at tick {tick}")]
    Mismatch { tick: usize },
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Header prepended to every record; validated before the payload is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of resolved ticks in the captured run.
    pub tick_count: u64,
}

impl RecordHeader {
    fn new(tick_count: u64) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: FORMAT_VERSION,
            tick_count,
        }
    }

    fn validate(&self) -> Result<(), DecodeError> {
        if self.magic != RECORD_MAGIC {
            return Err(DecodeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DecodeError::FutureVersion(self.version));
        }
        Ok(())
    }
}

/// One captured placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub cell: CellIndex,
    pub machine: Machine,
    pub orientation: Orientation,
    pub run_added: u32,
}

/// A complete, self-contained run record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub header: RecordHeader,
    pub grid: GridConfig,
    pub placements: Vec<PlacementRecord>,
    pub seed: Vec<Object>,
    pub ticks: Vec<Vec<Change>>,
}

impl RunRecord {
    /// Capture a record from the board a run was simulated against and its
    /// outcome.
    pub fn capture(board: &Board, seed: Vec<Object>, outcome: &RunOutcome) -> Self {
        let placements = board
            .iter_placed()
            .map(|(cell, state)| PlacementRecord {
                cell,
                machine: state.machine,
                orientation: state.orientation,
                run_added: state.run_added,
            })
            .collect();
        Self {
            header: RecordHeader::new(outcome.ticks.len() as u64),
            grid: *board.config(),
            placements,
            seed,
            ticks: outcome.ticks.clone(),
        }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        bitcode::serialize(self).map_err(|e| EncodeError::Encode(e.to_string()))
    }

    /// Decode from bytes, validating the header.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let record: RunRecord =
            bitcode::deserialize(data).map_err(|e| DecodeError::Decode(e.to_string()))?;
        record.header.validate()?;
        Ok(record)
    }

    /// Rebuild the board the record was captured from.
    pub fn rebuild_board(&self) -> Result<Board, PlaceError> {
        let mut board = Board::new(self.grid);
        for p in &self.placements {
            board.place(p.cell, p.machine, p.orientation, p.run_added)?;
        }
        Ok(board)
    }

    /// Replay verification: re-simulate from the captured inputs and compare
    /// the change stream tick by tick.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let board = self.rebuild_board()?;
        let outcome = run::simulate_seeded(&board, self.seed.clone());

        if outcome.ticks.len() != self.ticks.len() {
            return Err(VerifyError::Mismatch {
                tick: outcome.ticks.len().min(self.ticks.len()),
            });
        }
        for (tick, (replayed, recorded)) in
            outcome.ticks.iter().zip(self.ticks.iter()).enumerate()
        {
            if replayed != recorded {
                return Err(VerifyError::Mismatch { tick });
            }
        }
        Ok(())
    }
}
