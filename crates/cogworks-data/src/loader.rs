//! Layout loading: reads layout files, resolves machine names, builds boards.
//!
//! Provides format detection (RON/JSON), deserialization, and resolution of
//! the string-keyed schema types into live engine types.

use crate::schema::{LayoutData, OrientationData};
use cogworks_core::board::{Board, PlaceError};
use cogworks_core::grid::{GridConfig, Orientation};
use cogworks_core::machine::Machine;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during layout loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error: {detail}")]
    Parse { detail: String },

    /// A machine name did not match the catalogue.
    #[error("unknown machine '{name}'")]
    UnknownMachine { name: String },

    /// A placement was rejected by the board.
    #[error(transparent)]
    Place(#[from] PlaceError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported layout file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Parsing and resolution
// ===========================================================================

/// Deserialize layout text in the given format.
pub fn parse_layout(content: &str, format: Format) -> Result<LayoutData, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| DataLoadError::Parse {
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(content).map_err(|e| DataLoadError::Parse {
            detail: e.to_string(),
        }),
    }
}

/// Resolve a parsed layout into a live board.
///
/// Machine names are matched case-insensitively against the catalogue;
/// placements are applied in file order, so board-level rejections
/// (occupied cell, margin cell) surface with the offending entry.
pub fn build_board(layout: &LayoutData) -> Result<Board, DataLoadError> {
    let config = GridConfig {
        cols: layout.grid.cols,
        rows: layout.grid.rows,
        display_cols: layout.grid.display_cols,
        display_rows: layout.grid.display_rows,
    };
    let mut board = Board::new(config);

    for entry in &layout.placements {
        let machine =
            Machine::from_name(&entry.machine).ok_or_else(|| DataLoadError::UnknownMachine {
                name: entry.machine.clone(),
            })?;
        let cell = config.cell(entry.row, entry.col);
        board.place(cell, machine, resolve_orientation(entry.orientation), entry.run_added)?;
    }

    board.refresh_effects();
    Ok(board)
}

fn resolve_orientation(data: OrientationData) -> Orientation {
    match data {
        OrientationData::North => Orientation::North,
        OrientationData::East => Orientation::East,
        OrientationData::South => Orientation::South,
        OrientationData::West => Orientation::West,
    }
}

/// Read a layout file and build the board it describes.
pub fn load_layout(path: &Path) -> Result<Board, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let layout = parse_layout(&content, format)?;
    build_board(&layout)
}

// ===========================================================================
// Tests
// ===========================================================================
