//! Observable state container for the committed quote table.
//!
//! `QuoteBoard` is the single place where the snapshot and the refresh status
//! change. Readers subscribe to a `watch` channel and always see a whole
//! `BoardState`; writers go through `begin_cycle` and `commit`, which run under the
//! channel's lock and are therefore serialized.
//!
//! Two guards protect the state from late results:
//! - once `deactivate` has run, every later `commit` is refused;
//! - a cycle never overwrites state committed by a newer cycle.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use stock_common::snapshot::{RefreshStatus, Snapshot};
use tokio::sync::watch;

use crate::aggregator::CycleError;

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    /// Last committed snapshot.
    pub snapshot: Arc<Snapshot>,
    /// Status of the current cycle.
    pub status: RefreshStatus,
    /// Time of the last successful commit.
    pub last_update: Option<DateTime<Utc>>,
    active: bool,
    started: u64,
    committed: u64,
}

impl BoardState {
    /// `false` once the board has been shut down.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Generation of the cycle whose outcome is currently shown (0 before any).
    pub fn committed_generation(&self) -> u64 {
        self.committed
    }
}

/// Owner of `BoardState`.
pub struct QuoteBoard {
    tx: watch::Sender<BoardState>,
}

impl Default for QuoteBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteBoard {
    /// Active board with an empty snapshot and `Idle` status.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BoardState {
            active: true,
            ..BoardState::default()
        });
        QuoteBoard { tx }
    }

    /// Receiver that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    pub fn current(&self) -> BoardState {
        self.tx.borrow().clone()
    }

    /// `false` once `deactivate` has run.
    pub fn is_active(&self) -> bool {
        self.tx.borrow().active
    }

    /// Register a new cycle and mark the board `InFlight`.
    ///
    /// Returns the cycle's generation, or `None` when the board is inactive.
    pub fn begin_cycle(&self) -> Option<u64> {
        let mut generation = None;
        self.tx.send_if_modified(|state| {
            if !state.active {
                return false;
            }
            state.started += 1;
            state.status = RefreshStatus::InFlight;
            generation = Some(state.started);
            true
        });
        generation
    }

    /// Apply the outcome of cycle `generation`.
    ///
    /// Success replaces the snapshot and records `Succeeded`; failure records
    /// `Failed` and keeps the previous snapshot. Returns `false` without touching
    /// anything when the board is inactive or a newer cycle already committed.
    pub fn commit(&self, generation: u64, outcome: Result<Snapshot, CycleError>) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if !state.active {
                debug!("Board inactive; dropping result of cycle {}", generation);
                return false;
            }
            if generation <= state.committed {
                debug!(
                    "Cycle {} finished after cycle {}; dropping its result",
                    generation, state.committed
                );
                return false;
            }

            match outcome {
                Ok(snapshot) => {
                    let now = snapshot.taken_at().unwrap_or_else(Utc::now);
                    state.snapshot = Arc::new(snapshot);
                    state.status = RefreshStatus::Succeeded(now);
                    state.last_update = Some(now);
                }
                Err(e) => state.status = RefreshStatus::Failed(e.to_string()),
            }
            state.committed = generation;
            applied = true;
            true
        });
        applied
    }

    /// Refuse every later commit.
    pub fn deactivate(&self) {
        self.tx.send_if_modified(|state| {
            let was_active = state.active;
            state.active = false;
            was_active
        });
    }
}
