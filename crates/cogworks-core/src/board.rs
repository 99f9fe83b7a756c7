//! Placement storage: which machine sits on which cell, facing where.
//!
//! Placements live in a slotmap (stable identity for the surrounding UI)
//! with a dense per-cell index on the side (ascending-cell iteration for the
//! simulator). At most one machine occupies a cell; the simulator never
//! creates or destroys placements, it only reads them.

use crate::effect::{self, DurationUnit, Effect, EffectEmission};
use crate::grid::{CellIndex, GridConfig, Orientation};
use crate::machine::Machine;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable identity of a placed machine, valid until it is sold or the
    /// board is reset.
    pub struct PlacementId;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("cell {cell} already holds a machine")]
    Occupied { cell: CellIndex },

    #[error("cell {cell} is outside the interactive region")]
    OutsideInteractive { cell: CellIndex },

    #[error("cell {cell} holds no machine to move")]
    Vacant { cell: CellIndex },
}

// ---------------------------------------------------------------------------
// Machine state
// ---------------------------------------------------------------------------

/// A placed machine: behavior variant, facing, attached effects, and the
/// bookkeeping the surrounding UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub machine: Machine,
    pub orientation: Orientation,
    /// Effects granted by neighboring machines. Refreshed on placement
    /// changes, expired by the loop matching each effect's duration unit.
    pub effects: Vec<Effect>,
    /// The run index at which this machine was placed. The UI uses it to
    /// forbid moving or selling machines added mid-run; the core only
    /// stores it.
    pub run_added: u32,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The full placement state of the factory floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    config: GridConfig,
    placements: SlotMap<PlacementId, MachineState>,
    /// One entry per backing-array cell, indexed by `CellIndex`.
    cells: Vec<Option<PlacementId>>,
}

impl Board {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            placements: SlotMap::with_key(),
            cells: vec![None; config.cell_count()],
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Place a machine. Only interactive cells accept machines, and a cell
    /// holds at most one.
    pub fn place(
        &mut self,
        cell: CellIndex,
        machine: Machine,
        orientation: Orientation,
        run_added: u32,
    ) -> Result<PlacementId, PlaceError> {
        if !self.config.in_interactive(cell) {
            return Err(PlaceError::OutsideInteractive { cell });
        }
        if self.cells[cell as usize].is_some() {
            return Err(PlaceError::Occupied { cell });
        }
        let id = self.placements.insert(MachineState {
            machine,
            orientation,
            effects: Vec::new(),
            run_added,
        });
        self.cells[cell as usize] = Some(id);
        Ok(id)
    }

    /// Remove the machine at `cell`, returning its state.
    pub fn remove(&mut self, cell: CellIndex) -> Option<MachineState> {
        if !self.config.in_backing(cell) {
            return None;
        }
        let id = self.cells[cell as usize].take()?;
        self.placements.remove(id)
    }

    /// Move a placement to a new cell, preserving its identity and state.
    /// An empty or off-grid source is an error, not a no-op.
    pub fn relocate(&mut self, from: CellIndex, to: CellIndex) -> Result<(), PlaceError> {
        let Some(id) = self
            .cells
            .get(from as usize)
            .copied()
            .flatten()
            .filter(|_| self.config.in_backing(from))
        else {
            return Err(PlaceError::Vacant { cell: from });
        };
        if !self.config.in_interactive(to) {
            return Err(PlaceError::OutsideInteractive { cell: to });
        }
        if self.cells[to as usize].is_some() {
            return Err(PlaceError::Occupied { cell: to });
        }
        self.cells[from as usize] = None;
        self.cells[to as usize] = Some(id);
        Ok(())
    }

    pub fn machine_at(&self, cell: CellIndex) -> Option<&MachineState> {
        if !self.config.in_backing(cell) {
            return None;
        }
        let id = self.cells[cell as usize]?;
        self.placements.get(id)
    }

    pub fn placement_at(&self, cell: CellIndex) -> Option<PlacementId> {
        if !self.config.in_backing(cell) {
            return None;
        }
        self.cells[cell as usize]
    }

    pub fn state(&self, id: PlacementId) -> Option<&MachineState> {
        self.placements.get(id)
    }

    pub fn state_mut(&mut self, id: PlacementId) -> Option<&mut MachineState> {
        self.placements.get_mut(id)
    }

    /// Rotate the machine at `cell` counterclockwise. Returns false when the
    /// cell is empty.
    pub fn rotate_left(&mut self, cell: CellIndex) -> bool {
        self.rotate(cell, Orientation::rotated_left)
    }

    /// Rotate the machine at `cell` clockwise.
    pub fn rotate_right(&mut self, cell: CellIndex) -> bool {
        self.rotate(cell, Orientation::rotated_right)
    }

    fn rotate(&mut self, cell: CellIndex, step: fn(Orientation) -> Orientation) -> bool {
        let Some(id) = self.placement_at(cell) else {
            return false;
        };
        if let Some(state) = self.placements.get_mut(id) {
            state.orientation = step(state.orientation);
            true
        } else {
            false
        }
    }

    /// All placements in ascending cell order -- the order the simulator
    /// invokes machines in.
    pub fn iter_placed(&self) -> impl Iterator<Item = (CellIndex, &MachineState)> {
        self.cells.iter().enumerate().filter_map(|(pos, id)| {
            let state = self.placements.get((*id)?)?;
            Some((pos as CellIndex, state))
        })
    }

    /// Number of placed machines.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    /// Re-derive all neighbor-granted effects. Two-phase: every machine's
    /// emission scan runs against the frozen placement set, then the
    /// collected emissions are attached. Each machine's effect list is
    /// replaced wholesale, so calling this repeatedly never stacks
    /// duplicates.
    ///
    /// Invoked once per placement change, never per simulation tick.
    pub fn refresh_effects(&mut self) {
        let emissions: Vec<EffectEmission> = self
            .iter_placed()
            .flat_map(|(cell, state)| state.machine.emit_effects(self, cell))
            .collect();

        for state in self.placements.values_mut() {
            state.effects.clear();
        }
        for emission in emissions {
            if let Some(id) = self.placement_at(emission.target)
                && let Some(state) = self.placements.get_mut(id)
            {
                state.effects.push(emission.effect);
            }
        }
    }

    /// Run one expiry pass over every placement's effect list for the given
    /// duration unit.
    pub fn expire_effects(&mut self, unit: DurationUnit) {
        for state in self.placements.values_mut() {
            effect::expire_elapsed(&mut state.effects, unit);
        }
    }
}
