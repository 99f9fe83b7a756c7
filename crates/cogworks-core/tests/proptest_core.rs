//! Property tests: invariants that hold for arbitrary board layouts.

use cogworks_core::board::Board;
use cogworks_core::grid::{GridConfig, Orientation};
use cogworks_core::machine::Machine;
use cogworks_core::run::{self, TICK_LIMIT};
use proptest::prelude::*;

fn arb_machine() -> impl Strategy<Value = Machine> {
    prop::sample::select(Machine::ALL.to_vec())
}

fn arb_orientation() -> impl Strategy<Value = Orientation> {
    prop::sample::select(Orientation::ALL.to_vec())
}

/// Arbitrary boards: up to 20 placements at random interactive cells (later
/// duplicates of an occupied cell are skipped).
fn arb_board() -> impl Strategy<Value = Board> {
    prop::collection::vec(
        (1..8i32, 1..8i32, arb_machine(), arb_orientation()),
        0..20,
    )
    .prop_map(|placements| {
        let mut board = Board::new(GridConfig::default());
        for (row, col, machine, orientation) in placements {
            let cell = board.config().cell(row, col);
            let _ = board.place(cell, machine, orientation, 0);
        }
        board
    })
}

proptest! {
    #[test]
    fn simulation_never_panics_and_respects_the_limit(board in arb_board()) {
        let outcome = run::simulate(&board);
        prop_assert!(outcome.tick_count() <= TICK_LIMIT);
        prop_assert_eq!(outcome.limit_reached, outcome.tick_count() == TICK_LIMIT);
    }

    #[test]
    fn history_always_holds_one_entry_per_tick_plus_seed(board in arb_board()) {
        let outcome = run::simulate(&board);
        prop_assert_eq!(outcome.history.len(), outcome.tick_count() + 1);
        prop_assert!(outcome.history[0].is_empty());
    }

    #[test]
    fn every_resolved_tick_carries_at_least_one_change(board in arb_board()) {
        let outcome = run::simulate(&board);
        for tick in &outcome.ticks {
            prop_assert!(!tick.is_empty());
        }
    }

    #[test]
    fn resimulation_is_bit_identical(board in arb_board()) {
        let first = run::simulate(&board);
        let second = run::simulate(&board);
        prop_assert_eq!(&first, &second);

        let a = bitcode::serialize(&first).unwrap();
        let b = bitcode::serialize(&second).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_snapshot_matches_its_tick_changes(board in arb_board()) {
        // The snapshot at index t + 1 is exactly the non-nil end objects of
        // tick t, in change order.
        let outcome = run::simulate(&board);
        for (t, changes) in outcome.ticks.iter().enumerate() {
            let rebuilt: Vec<_> = changes
                .iter()
                .filter_map(|c| c.end.clone())
                .collect();
            prop_assert_eq!(&outcome.history[t + 1], &rebuilt);
        }
    }

    #[test]
    fn folded_score_terms_stay_sane(board in arb_board()) {
        // Bases start at 1 and are only added, doubled, or halved-with-floor,
        // so the folded base can never go negative.
        let score = run::simulate(&board).score();
        prop_assert!(score.folded().base >= 0);
    }
}
