//! Off-thread run execution.
//!
//! A run can take visible time on dense boards, so callers that drive a UI
//! hand the board to a worker thread and poll for the result each frame.
//! The protocol is deliberately minimal: spawn, poll, take. There is no
//! cancellation; runs are bounded by the simulator's safety limit, so the
//! worker always finishes.

use crate::board::Board;
use crate::run::{self, RunOutcome};
use std::thread::JoinHandle;

/// A run executing on a worker thread.
///
/// The board is cloned into the worker, so the caller's copy stays free for
/// reads while the run resolves.
#[derive(Debug)]
pub struct BackgroundRun {
    handle: Option<JoinHandle<RunOutcome>>,
}

impl BackgroundRun {
    /// Start simulating `board` on a new thread.
    pub fn spawn(board: Board) -> Self {
        let handle = std::thread::spawn(move || run::simulate(&board));
        Self {
            handle: Some(handle),
        }
    }

    /// True once the worker has finished (or the outcome was already taken).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Take the outcome if the run has finished. Returns `None` while the
    /// worker is still running and after the outcome has been taken.
    ///
    /// Propagates a worker panic to the caller; the simulator is panic-free
    /// on valid boards, so this only fires on internal invariant violations.
    pub fn try_take(&mut self) -> Option<RunOutcome> {
        if !self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(outcome) => Some(outcome),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}
