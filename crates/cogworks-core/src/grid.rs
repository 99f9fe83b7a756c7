//! Grid addressing: linear cell indices, orientations, and neighbor math.
//!
//! The board is a fixed rectangular array addressed by `pos = row * cols +
//! col`. The playable region is a smaller centered rectangle inside a larger
//! backing array; the margin ring lets machines reference positions off the
//! interactive area without bounds checks. Adjacency never clamps -- an
//! off-grid result is the caller's to tolerate, not an error.

use serde::{Deserialize, Serialize};

/// Linear cell index into the backing array. Signed so that stepping off the
/// top or left edge stays representable.
pub type CellIndex = i32;

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// The direction a machine is facing. Determines which neighbor it treats
/// as "forward".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// All orientations in rotation order (clockwise from North).
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Rotate one step counterclockwise (subtract 1 mod 4).
    pub fn rotated_left(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Rotate one step clockwise (add 1 mod 4).
    pub fn rotated_right(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    /// Row/column step for one cell in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Orientation::North => (-1, 0),
            Orientation::East => (0, 1),
            Orientation::South => (1, 0),
            Orientation::West => (0, -1),
        }
    }

    fn index(self) -> usize {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid configuration
// ---------------------------------------------------------------------------

/// Dimensions of the backing array and the centered interactive region.
///
/// Supplied by the surrounding layout code; the simulator only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Columns in the backing array.
    pub cols: i32,
    /// Rows in the backing array.
    pub rows: i32,
    /// Columns in the interactive (placeable) region.
    pub display_cols: i32,
    /// Rows in the interactive region.
    pub display_rows: i32,
}

impl GridConfig {
    /// Compose a cell index from row and column.
    pub fn cell(&self, row: i32, col: i32) -> CellIndex {
        row * self.cols + col
    }

    /// Decompose a cell index into (row, col).
    pub fn row_col(&self, pos: CellIndex) -> (i32, i32) {
        (pos / self.cols, pos % self.cols)
    }

    /// The neighbor of `pos` one step in `orientation`.
    ///
    /// No bounds checking: the result may lie outside the backing array.
    /// The simulator tolerates this by never finding a machine there -- an
    /// object pushed off-grid is lost from play, which is accepted behavior.
    pub fn adjacent(&self, pos: CellIndex, orientation: Orientation) -> CellIndex {
        let (row, col) = self.row_col(pos);
        let (dr, dc) = orientation.delta();
        self.cell(row + dr, col + dc)
    }

    /// Whether `pos` lies inside the backing array.
    pub fn in_backing(&self, pos: CellIndex) -> bool {
        if pos < 0 {
            return false;
        }
        let (row, col) = self.row_col(pos);
        row < self.rows && col < self.cols
    }

    /// Whether `pos` lies inside the centered interactive region.
    pub fn in_interactive(&self, pos: CellIndex) -> bool {
        if pos < 0 {
            return false;
        }
        let (row, col) = self.row_col(pos);
        let row_margin = (self.rows - self.display_rows) / 2;
        let col_margin = (self.cols - self.display_cols) / 2;
        row >= row_margin
            && row < row_margin + self.display_rows
            && col >= col_margin
            && col < col_margin + self.display_cols
    }

    /// The four orthogonal neighbors of `pos` that lie inside the backing
    /// array. Used by effect emission, which is bounds-aware (unlike object
    /// movement).
    pub fn neighbors4(&self, pos: CellIndex) -> Vec<CellIndex> {
        Orientation::ALL
            .iter()
            .map(|&o| self.adjacent(pos, o))
            .filter(|&p| self.in_backing(p) && self.row_col_adjacent(pos, p))
            .collect()
    }

    /// Total cells in the backing array.
    pub fn cell_count(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    // Guards against wrap-around: `adjacent` on a left-edge cell facing West
    // produces an index that is numerically valid but on the previous row.
    fn row_col_adjacent(&self, a: CellIndex, b: CellIndex) -> bool {
        let (ar, ac) = self.row_col(a);
        let (br, bc) = self.row_col(b);
        (ar - br).abs() + (ac - bc).abs() == 1
    }
}

impl Default for GridConfig {
    /// 9x9 backing array with a centered 7x7 interactive region.
    fn default() -> Self {
        Self {
            cols: 9,
            rows: 9,
            display_cols: 7,
            display_rows: 7,
        }
    }
}
