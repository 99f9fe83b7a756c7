//! The machine catalogue and its per-tick behavior.
//!
//! [`Machine`] is a fieldless sum type dispatched by `match` (no trait
//! objects). A single variant value serves every placement of that machine:
//! [`Machine::process`] is a pure function of its inputs, reading only the
//! most recent entry of the run history and returning the changes this
//! machine causes this tick.
//!
//! Effect emission ([`Machine::emit_effects`]) is a separate, bounds-aware
//! neighbor scan invoked once per placement refresh, never per tick.

use crate::board::Board;
use crate::change::Change;
use crate::effect::{DurationUnit, Effect, EffectEmission, EffectKind};
use crate::grid::{CellIndex, GridConfig, Orientation};
use crate::object::{Object, ObjectKind};
use crate::score::Fixed64;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// UI-facing role tags for filtering and tooltips. The simulator never
/// consults these; effect emission uses them as a targeting predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineRole {
    Producer,
    Consumer,
    Mover,
    Upgrader,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// The machine catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Machine {
    /// Emits one object per tick for the first three ticks of a run,
    /// cycling Red, Green, Blue.
    Miner,
    /// Moves an object one cell forward, unchanged.
    Conveyor,
    /// Moves an object forward and advances its color; green inputs add +1
    /// to the additive multiplier term.
    Processor,
    /// Moves an object forward and doubles its base value.
    Amplifier,
    /// Moves an object forward; buffs the speed of neighboring machines.
    Booster,
    /// Moves an object forward; buffs the efficiency of neighboring
    /// machines.
    Catalyst,
    /// Duplicates an object into two halves of the base value.
    Splitter,
    /// Merges the first two objects on its cell into one.
    Combiner,
    /// Consumes objects and banks their score payload.
    Collector,
}

impl Machine {
    /// Every machine variant, in catalogue order.
    pub const ALL: [Machine; 9] = [
        Machine::Miner,
        Machine::Conveyor,
        Machine::Processor,
        Machine::Amplifier,
        Machine::Booster,
        Machine::Catalyst,
        Machine::Splitter,
        Machine::Combiner,
        Machine::Collector,
    ];

    // -----------------------------------------------------------------------
    // Tick behavior
    // -----------------------------------------------------------------------

    /// Resolve this machine's behavior for one tick.
    ///
    /// `history` is the run history so far; only its most recent entry (the
    /// frozen current snapshot) is ever read. Pure: no hidden state, so one
    /// variant value can serve any number of placements.
    pub fn process(
        &self,
        cell: CellIndex,
        history: &[Vec<Object>],
        tick: usize,
        orientation: Orientation,
        grid: &GridConfig,
    ) -> Vec<Change> {
        // History starts with one seeded entry, so at tick t it holds t + 1
        // snapshots. The miner's cadence rule leans on this.
        debug_assert_eq!(history.len(), tick + 1);

        let current: &[Object] = history.last().map(Vec::as_slice).unwrap_or(&[]);
        let forward = grid.adjacent(cell, orientation);

        match self {
            Machine::Miner => process_miner(cell, history, orientation, grid),
            Machine::Conveyor | Machine::Booster | Machine::Catalyst => {
                process_mover(cell, current, forward)
            }
            Machine::Processor => process_processor(cell, current, forward),
            Machine::Amplifier => process_amplifier(cell, current, forward),
            Machine::Splitter => process_splitter(cell, current, forward),
            Machine::Combiner => process_combiner(cell, current, forward),
            Machine::Collector => process_collector(cell, current),
        }
    }

    // -----------------------------------------------------------------------
    // Effect emission
    // -----------------------------------------------------------------------

    /// Scan the four orthogonal neighbors of `origin` and return the effects
    /// this machine grants them. Invoked once per placement/refresh event by
    /// the surrounding layer -- not part of the per-tick hot path.
    pub fn emit_effects(&self, board: &Board, origin: CellIndex) -> Vec<EffectEmission> {
        match self {
            Machine::Booster => broadcast(
                board,
                origin,
                Effect::new(EffectKind::BuffSpeed, 5, DurationUnit::Ticks),
                None,
            ),
            Machine::Catalyst => broadcast(
                board,
                origin,
                Effect::new(EffectKind::BuffEfficiency, 10, DurationUnit::Ticks),
                None,
            ),
            Machine::Amplifier => broadcast(
                board,
                origin,
                Effect::new(EffectKind::AmplifyValue, 1, DurationUnit::Ticks),
                Some(MachineRole::Producer),
            ),
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Declarative metadata (UI only)
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &'static str {
        match self {
            Machine::Miner => "Miner",
            Machine::Conveyor => "Conveyor",
            Machine::Processor => "Processor",
            Machine::Amplifier => "Amplifier",
            Machine::Booster => "Booster",
            Machine::Catalyst => "Catalyst",
            Machine::Splitter => "Splitter",
            Machine::Combiner => "Combiner",
            Machine::Collector => "Collector",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Machine::Miner => "Generates objects of different colors.",
            Machine::Conveyor => "Moves objects forward.",
            Machine::Processor => {
                "Moves objects forward and advances their color; green inputs grow the multiplier."
            }
            Machine::Amplifier => {
                "Doubles the value of objects passing through and boosts nearby producers."
            }
            Machine::Booster => "Moves objects forward and speeds up adjacent machines.",
            Machine::Catalyst => {
                "Moves objects forward and increases efficiency of adjacent machines."
            }
            Machine::Splitter => "Splits one object into two of half the value.",
            Machine::Combiner => "Combines two objects into one with merged value and multipliers.",
            Machine::Collector => "Consumes objects and banks their score.",
        }
    }

    /// Placement cost in money.
    pub fn cost(&self) -> i64 {
        match self {
            Machine::Miner => 5,
            Machine::Conveyor => 2,
            Machine::Processor => 3,
            Machine::Amplifier => 6,
            Machine::Booster => 4,
            Machine::Catalyst => 5,
            Machine::Splitter => 4,
            Machine::Combiner => 6,
            Machine::Collector => 0,
        }
    }

    /// Display color as RGB.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Machine::Miner => [139, 69, 19],
            Machine::Conveyor => [200, 200, 200],
            Machine::Processor => [100, 200, 100],
            Machine::Amplifier => [255, 215, 0],
            Machine::Booster => [0, 255, 255],
            Machine::Catalyst => [255, 165, 0],
            Machine::Splitter => [150, 150, 255],
            Machine::Combiner => [255, 0, 255],
            Machine::Collector => [255, 150, 150],
        }
    }

    pub fn roles(&self) -> &'static [MachineRole] {
        match self {
            Machine::Miner => &[MachineRole::Producer],
            Machine::Conveyor => &[MachineRole::Mover],
            Machine::Processor => &[MachineRole::Mover, MachineRole::Upgrader],
            Machine::Amplifier => &[MachineRole::Mover, MachineRole::Upgrader],
            Machine::Booster => &[MachineRole::Mover],
            Machine::Catalyst => &[MachineRole::Mover],
            Machine::Splitter => &[MachineRole::Mover, MachineRole::Producer],
            Machine::Combiner => &[MachineRole::Consumer, MachineRole::Producer],
            Machine::Collector => &[MachineRole::Consumer],
        }
    }

    /// Look a machine up by name (case-insensitive). Used by layout files.
    pub fn from_name(name: &str) -> Option<Machine> {
        Machine::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

// ---------------------------------------------------------------------------
// Variant behaviors
// ---------------------------------------------------------------------------

/// The first object occupying `cell` in the snapshot, in stable iteration
/// order. Non-combiner machines act on this object only; extra co-located
/// objects silently wait for a later tick.
fn first_at(current: &[Object], cell: CellIndex) -> Option<&Object> {
    current.iter().find(|obj| obj.cell == cell)
}

fn process_miner(
    cell: CellIndex,
    history: &[Vec<Object>],
    orientation: Orientation,
    grid: &GridConfig,
) -> Vec<Change> {
    // Cadence is keyed to the history length, not a counter: the seeded
    // initial snapshot makes lengths 1..=3 correspond to the first three
    // ticks of the run.
    let kind = match history.len() {
        1 => ObjectKind::Red,
        2 => ObjectKind::Green,
        3 => ObjectKind::Blue,
        _ => return Vec::new(),
    };
    vec![Change::emission(Object::new(
        grid.adjacent(cell, orientation),
        kind,
    ))]
}

fn process_mover(cell: CellIndex, current: &[Object], forward: CellIndex) -> Vec<Change> {
    match first_at(current, cell) {
        Some(obj) => vec![Change::transfer(
            obj.clone(),
            Object::with_score(forward, obj.kind, obj.score),
        )],
        None => Vec::new(),
    }
}

fn process_processor(cell: CellIndex, current: &[Object], forward: CellIndex) -> Vec<Change> {
    match first_at(current, cell) {
        Some(obj) => {
            let mut score = obj.score;
            // Green inputs feed the additive multiplier; the check is on the
            // pre-transform kind.
            if obj.kind == ObjectKind::Green {
                score.mult_add = score.mult_add.saturating_add(Fixed64::from_num(1));
            }
            vec![Change::transfer(
                obj.clone(),
                Object::with_score(forward, obj.kind.next(), score),
            )]
        }
        None => Vec::new(),
    }
}

fn process_amplifier(cell: CellIndex, current: &[Object], forward: CellIndex) -> Vec<Change> {
    match first_at(current, cell) {
        Some(obj) => {
            let mut score = obj.score;
            // Saturating: an amplifier inside a conveyor loop doubles the
            // base every lap, which would overflow i64 within the safety
            // limit.
            score.base = score.base.saturating_mul(2);
            vec![Change::transfer(
                obj.clone(),
                Object::with_score(forward, obj.kind, score),
            )]
        }
        None => Vec::new(),
    }
}

fn process_splitter(cell: CellIndex, current: &[Object], forward: CellIndex) -> Vec<Change> {
    match first_at(current, cell) {
        Some(obj) => {
            let half = obj.score.halved();
            let duplicate = || {
                Change::transfer(obj.clone(), Object::with_score(forward, obj.kind, half))
            };
            vec![duplicate(), duplicate()]
        }
        None => Vec::new(),
    }
}

fn process_combiner(cell: CellIndex, current: &[Object], forward: CellIndex) -> Vec<Change> {
    let mut at_cell = current.iter().filter(|obj| obj.cell == cell);
    match (at_cell.next(), at_cell.next()) {
        (Some(first), Some(second)) => {
            let merged = first.score.combine(&second.score);
            vec![
                Change::transfer(
                    first.clone(),
                    Object::with_score(forward, first.kind, merged),
                ),
                Change::despawn(second.clone(), None),
            ]
        }
        // Fewer than two objects: wait.
        _ => Vec::new(),
    }
}

fn process_collector(cell: CellIndex, current: &[Object]) -> Vec<Change> {
    match first_at(current, cell) {
        Some(obj) => vec![Change::despawn(obj.clone(), Some(obj.score))],
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Effect broadcast helper
// ---------------------------------------------------------------------------

/// Emit `effect` toward every in-bounds orthogonal neighbor of `origin` that
/// holds a machine, optionally restricted to machines carrying `role`.
fn broadcast(
    board: &Board,
    origin: CellIndex,
    effect: Effect,
    role: Option<MachineRole>,
) -> Vec<EffectEmission> {
    board
        .config()
        .neighbors4(origin)
        .into_iter()
        .filter_map(|target| {
            let state = board.machine_at(target)?;
            let eligible = role.is_none_or(|r| state.machine.roles().contains(&r));
            eligible.then_some(EffectEmission { target, effect })
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScorePayload;

    // Helpers ---------------------------------------------------------------

    fn grid() -> GridConfig {
        GridConfig::default()
    }

    fn payload(base: i64, mult_add: i64, mult_mult: i64) -> ScorePayload {
        ScorePayload {
            base,
            mult_add: Fixed64::from_num(mult_add),
            mult_mult: Fixed64::from_num(mult_mult),
        }
    }

    /// A history whose latest snapshot is `current`, padded with empty
    /// snapshots so the miner cadence rule sees the right length.
    fn history_at_tick(tick: usize, current: Vec<Object>) -> Vec<Vec<Object>> {
        let mut history = vec![Vec::new(); tick];
        history.push(current);
        history
    }

    // -----------------------------------------------------------------------
    // Miner cadence
    // -----------------------------------------------------------------------

    #[test]
    fn miner_emits_red_green_blue_then_stops() {
        let grid = grid();
        let cell = grid.cell(2, 2);
        let expected = [ObjectKind::Red, ObjectKind::Green, ObjectKind::Blue];

        for (tick, kind) in expected.iter().enumerate() {
            let history = history_at_tick(tick, Vec::new());
            let changes =
                Machine::Miner.process(cell, &history, tick, Orientation::East, &grid);
            assert_eq!(changes.len(), 1, "tick {tick} should emit one object");
            assert!(changes[0].is_emission());
            let end = changes[0].end.as_ref().unwrap();
            assert_eq!(end.kind, *kind);
            assert_eq!(end.cell, grid.cell(2, 3));
            assert_eq!(end.score, ScorePayload::unit());
        }

        // Tick 4 onward: silence.
        for tick in 3..6 {
            let history = history_at_tick(tick, Vec::new());
            assert!(
                Machine::Miner
                    .process(cell, &history, tick, Orientation::East, &grid)
                    .is_empty()
            );
        }
    }

    #[test]
    fn miner_emission_follows_orientation() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        for (orientation, target) in [
            (Orientation::North, grid.cell(3, 4)),
            (Orientation::South, grid.cell(5, 4)),
            (Orientation::West, grid.cell(4, 3)),
        ] {
            let history = history_at_tick(0, Vec::new());
            let changes = Machine::Miner.process(cell, &history, 0, orientation, &grid);
            assert_eq!(changes[0].end.as_ref().unwrap().cell, target);
        }
    }

    // -----------------------------------------------------------------------
    // Movers
    // -----------------------------------------------------------------------

    #[test]
    fn conveyor_moves_object_unchanged() {
        let grid = grid();
        let cell = grid.cell(3, 3);
        let obj = Object::with_score(cell, ObjectKind::Blue, payload(7, 2, 3));
        let history = history_at_tick(1, vec![obj.clone()]);

        let changes = Machine::Conveyor.process(cell, &history, 1, Orientation::South, &grid);
        assert_eq!(changes.len(), 1);
        let end = changes[0].end.as_ref().unwrap();
        assert_eq!(end.cell, grid.cell(4, 3));
        assert_eq!(end.kind, ObjectKind::Blue);
        assert_eq!(end.score, payload(7, 2, 3));
    }

    #[test]
    fn conveyor_with_empty_cell_does_nothing() {
        let grid = grid();
        let history = history_at_tick(0, Vec::new());
        assert!(
            Machine::Conveyor
                .process(grid.cell(3, 3), &history, 0, Orientation::East, &grid)
                .is_empty()
        );
    }

    #[test]
    fn conveyor_moves_only_first_of_stacked_objects() {
        // Known asymmetry with the combiner path: the first object found in
        // snapshot order moves, the rest wait.
        let grid = grid();
        let cell = grid.cell(2, 2);
        let first = Object::with_score(cell, ObjectKind::Red, payload(1, 0, 1));
        let second = Object::with_score(cell, ObjectKind::Green, payload(9, 0, 1));
        let history = history_at_tick(2, vec![first.clone(), second]);

        let changes = Machine::Conveyor.process(cell, &history, 2, Orientation::East, &grid);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].start.as_ref().unwrap(), &first);
    }

    #[test]
    fn booster_and_catalyst_move_like_conveyors() {
        let grid = grid();
        let cell = grid.cell(5, 5);
        let obj = Object::with_score(cell, ObjectKind::Red, payload(4, 1, 2));
        let history = history_at_tick(1, vec![obj.clone()]);

        for machine in [Machine::Booster, Machine::Catalyst] {
            let changes = machine.process(cell, &history, 1, Orientation::East, &grid);
            assert_eq!(changes.len(), 1);
            let end = changes[0].end.as_ref().unwrap();
            assert_eq!(end.cell, grid.cell(5, 6));
            assert_eq!(end.kind, ObjectKind::Red);
            assert_eq!(end.score, payload(4, 1, 2));
        }
    }

    // -----------------------------------------------------------------------
    // Upgraders
    // -----------------------------------------------------------------------

    #[test]
    fn processor_advances_color() {
        let grid = grid();
        let cell = grid.cell(3, 3);
        let obj = Object::with_score(cell, ObjectKind::Red, payload(2, 0, 1));
        let history = history_at_tick(1, vec![obj]);

        let changes = Machine::Processor.process(cell, &history, 1, Orientation::East, &grid);
        let end = changes[0].end.as_ref().unwrap();
        assert_eq!(end.kind, ObjectKind::Green);
        // Red input: no multiplier bonus.
        assert_eq!(end.score, payload(2, 0, 1));
    }

    #[test]
    fn processor_rewards_green_inputs() {
        let grid = grid();
        let cell = grid.cell(3, 3);
        let obj = Object::with_score(cell, ObjectKind::Green, payload(2, 0, 1));
        let history = history_at_tick(1, vec![obj]);

        let changes = Machine::Processor.process(cell, &history, 1, Orientation::East, &grid);
        let end = changes[0].end.as_ref().unwrap();
        assert_eq!(end.kind, ObjectKind::Blue);
        assert_eq!(end.score.mult_add, Fixed64::from_num(1));
    }

    #[test]
    fn amplifier_doubles_base_value() {
        let grid = grid();
        let cell = grid.cell(3, 3);
        let obj = Object::with_score(cell, ObjectKind::Blue, payload(6, 1, 2));
        let history = history_at_tick(1, vec![obj]);

        let changes = Machine::Amplifier.process(cell, &history, 1, Orientation::East, &grid);
        let end = changes[0].end.as_ref().unwrap();
        assert_eq!(end.score, payload(12, 1, 2));
        assert_eq!(end.kind, ObjectKind::Blue);
    }

    // -----------------------------------------------------------------------
    // Splitter
    // -----------------------------------------------------------------------

    #[test]
    fn splitter_duplicates_with_halved_base() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let obj = Object::with_score(cell, ObjectKind::Red, payload(5, 2, 3));
        let history = history_at_tick(1, vec![obj.clone()]);

        let changes = Machine::Splitter.process(cell, &history, 1, Orientation::East, &grid);
        assert_eq!(changes.len(), 2);
        for change in &changes {
            // Both halves share the same start: this models duplication.
            assert_eq!(change.start.as_ref().unwrap(), &obj);
            let end = change.end.as_ref().unwrap();
            assert_eq!(end.cell, grid.cell(4, 5));
            assert_eq!(end.score, payload(2, 2, 3));
        }
    }

    #[test]
    fn splitter_floor_rule_never_drops_below_one() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let obj = Object::with_score(cell, ObjectKind::Red, payload(1, 0, 1));
        let history = history_at_tick(1, vec![obj]);

        let changes = Machine::Splitter.process(cell, &history, 1, Orientation::East, &grid);
        for change in &changes {
            assert_eq!(change.end.as_ref().unwrap().score.base, 1);
        }
    }

    // -----------------------------------------------------------------------
    // Combiner
    // -----------------------------------------------------------------------

    #[test]
    fn combiner_merges_first_two_objects() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let first = Object::with_score(cell, ObjectKind::Red, payload(5, 1, 2));
        let second = Object::with_score(cell, ObjectKind::Blue, payload(3, 0, 3));
        let history = history_at_tick(1, vec![first.clone(), second.clone()]);

        let changes = Machine::Combiner.process(cell, &history, 1, Orientation::East, &grid);
        assert_eq!(changes.len(), 2);

        // One merge: bases add, additive terms add, multiplicative multiply.
        let merge = &changes[0];
        assert!(merge.is_transfer());
        assert_eq!(merge.start.as_ref().unwrap(), &first);
        let end = merge.end.as_ref().unwrap();
        assert_eq!(end.cell, grid.cell(4, 5));
        assert_eq!(end.kind, ObjectKind::Red);
        assert_eq!(end.score, payload(8, 1, 6));

        // One deletion of the second object, no payload attached.
        let deletion = &changes[1];
        assert!(deletion.is_despawn());
        assert_eq!(deletion.start.as_ref().unwrap(), &second);
        assert!(deletion.score.is_none());
    }

    #[test]
    fn combiner_waits_for_two_objects() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let lone = Object::with_score(cell, ObjectKind::Red, payload(5, 0, 1));
        let history = history_at_tick(1, vec![lone]);

        assert!(
            Machine::Combiner
                .process(cell, &history, 1, Orientation::East, &grid)
                .is_empty()
        );
    }

    #[test]
    fn combiner_ignores_objects_on_other_cells() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let here = Object::with_score(cell, ObjectKind::Red, payload(5, 0, 1));
        let elsewhere = Object::with_score(grid.cell(4, 5), ObjectKind::Red, payload(3, 0, 1));
        let history = history_at_tick(1, vec![here, elsewhere]);

        assert!(
            Machine::Combiner
                .process(cell, &history, 1, Orientation::East, &grid)
                .is_empty()
        );
    }

    // -----------------------------------------------------------------------
    // Collector
    // -----------------------------------------------------------------------

    #[test]
    fn collector_banks_payload_unmodified() {
        let grid = grid();
        let cell = grid.cell(4, 4);
        let obj = Object::with_score(cell, ObjectKind::Green, payload(7, 2, 3));
        let history = history_at_tick(1, vec![obj.clone()]);

        let changes = Machine::Collector.process(cell, &history, 1, Orientation::East, &grid);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_despawn());
        assert_eq!(changes[0].score, Some(payload(7, 2, 3)));
        assert_eq!(changes[0].start.as_ref().unwrap(), &obj);
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    #[test]
    fn from_name_round_trips_the_catalogue() {
        for machine in Machine::ALL {
            assert_eq!(Machine::from_name(machine.name()), Some(machine));
            assert_eq!(
                Machine::from_name(&machine.name().to_lowercase()),
                Some(machine)
            );
        }
        assert_eq!(Machine::from_name("reactor"), None);
    }

    #[test]
    fn roles_cover_the_simulator_contract() {
        assert!(Machine::Miner.roles().contains(&MachineRole::Producer));
        assert!(Machine::Collector.roles().contains(&MachineRole::Consumer));
        assert!(Machine::Splitter.roles().contains(&MachineRole::Producer));
        assert!(Machine::Combiner.roles().contains(&MachineRole::Consumer));
    }
}
