//! Serde structs for board layout files.
//!
//! These define the on-disk format for factory layouts: a grid size and a
//! list of machine placements by name. They are deserialized from RON or
//! JSON and resolved into a live [`cogworks_core::board::Board`] by the
//! loader.

use serde::Deserialize;

/// A complete layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutData {
    #[serde(default)]
    pub grid: GridData,
    pub placements: Vec<PlacementData>,
}

/// Grid dimensions. The interactive region is centered inside the backing
/// array.
#[derive(Debug, Clone, Deserialize)]
pub struct GridData {
    pub cols: i32,
    pub rows: i32,
    pub display_cols: i32,
    pub display_rows: i32,
}

impl Default for GridData {
    fn default() -> Self {
        Self {
            cols: 9,
            rows: 9,
            display_cols: 7,
            display_rows: 7,
        }
    }
}

/// One machine placement, addressed by backing-array row and column.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementData {
    /// Machine name, matched case-insensitively against the catalogue.
    pub machine: String,
    pub row: i32,
    pub col: i32,
    #[serde(default)]
    pub orientation: OrientationData,
    #[serde(default)]
    pub run_added: u32,
}

/// Facing direction in a data file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationData {
    North,
    #[default]
    East,
    South,
    West,
}
