//! Periodic and on-demand refresh cycles.
//!
//! `RefreshScheduler::start` spawns one control task. It fires a cycle right away
//! and then on every tick of a fixed interval; manual refresh requests arrive on
//! a channel and take exactly the same path. Cycles run as their own tasks and
//! report back when done, so the control loop always knows how many are in
//! flight.
//!
//! Overlap handling is selected by `OverlapPolicy`:
//! - `Coalesce`: while a cycle runs, further triggers collapse into a single
//!   pending cycle that starts as soon as the running one finishes.
//! - `Overlap`: every trigger starts a cycle; the board's generation guard keeps
//!   an older cycle from overwriting a newer one.
//!
//! `SchedulerHandle::stop` deactivates the board before aborting the control
//! task. Cycles already in flight may still finish, but their commits are refused.
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use log::{debug, error, info};
use stock_common::TerminalError;
use stock_common::symbols::Symbol;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::aggregator::Aggregator;
use crate::board::QuoteBoard;

/// What happens to a trigger that arrives while a cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverlapPolicy {
    /// Remember at most one pending cycle.
    #[default]
    Coalesce,
    /// Start a new cycle immediately.
    Overlap,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Tick,
    Manual,
}

/// Run one cycle and commit its outcome to `board`.
///
/// Returns `true` when the outcome was committed. Used by both the scheduler
/// and one-shot runs.
pub async fn refresh_once(board: &QuoteBoard, aggregator: &Aggregator, symbols: &[Symbol]) -> bool {
    let Some(generation) = board.begin_cycle() else {
        debug!("Board inactive; refresh skipped");
        return false;
    };
    run_generation(board, aggregator, symbols, generation).await
}

async fn run_generation(
    board: &QuoteBoard,
    aggregator: &Aggregator,
    symbols: &[Symbol],
    generation: u64,
) -> bool {
    info!("Refresh cycle {} started for {} symbols", generation, symbols.len());
    let outcome = aggregator.run_cycle(symbols).await;
    match &outcome {
        Ok(snapshot) => info!("Refresh cycle {} fetched {} quotes", generation, snapshot.len()),
        Err(e) => error!("Refresh cycle {} failed: {}", generation, e),
    }

    let committed = board.commit(generation, outcome);
    if !committed {
        debug!("Refresh cycle {} result discarded", generation);
    }
    committed
}

/// Configuration for the control task.
pub struct RefreshScheduler {
    board: Arc<QuoteBoard>,
    aggregator: Aggregator,
    symbols: Arc<[Symbol]>,
    period: Duration,
    overlap: OverlapPolicy,
}

impl RefreshScheduler {
    /// Scheduler refreshing `symbols` into `board` every `period`.
    pub fn new(
        board: Arc<QuoteBoard>,
        aggregator: Aggregator,
        symbols: Vec<Symbol>,
        period: Duration,
        overlap: OverlapPolicy,
    ) -> Self {
        RefreshScheduler {
            board,
            aggregator,
            symbols: symbols.into(),
            period,
            overlap,
        }
    }

    /// Spawn the control task; the first cycle starts immediately.
    pub fn start(self) -> SchedulerHandle {
        let (manual_tx, manual_rx) = mpsc::unbounded_channel();
        let board = Arc::clone(&self.board);
        info!(
            "Scheduler started: {} symbols every {:?} ({:?})",
            self.symbols.len(),
            self.period,
            self.overlap
        );
        let task = tokio::spawn(self.run(manual_rx));
        SchedulerHandle {
            manual_tx,
            task,
            board,
        }
    }

    async fn run(self, mut manual_rx: UnboundedReceiver<()>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<u64>();
        let mut in_flight = 0usize;
        let mut pending = false;

        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => Trigger::Tick,
                request = manual_rx.recv() => match request {
                    Some(()) => Trigger::Manual,
                    None => break,
                },
                Some(generation) = done_rx.recv() => {
                    in_flight -= 1;
                    debug!("Cycle {} done; {} still in flight", generation, in_flight);
                    if pending && in_flight == 0 {
                        pending = false;
                        self.spawn_cycle(&done_tx, &mut in_flight);
                    }
                    continue;
                }
            };

            match self.overlap {
                OverlapPolicy::Coalesce if in_flight > 0 => {
                    if pending {
                        debug!("{:?} trigger absorbed by pending cycle", trigger);
                    } else {
                        debug!("{:?} trigger queued behind running cycle", trigger);
                        pending = true;
                    }
                }
                _ => {
                    debug!("{:?} trigger starts a cycle", trigger);
                    self.spawn_cycle(&done_tx, &mut in_flight);
                }
            }
        }
        debug!("Scheduler control loop finished");
    }

    fn spawn_cycle(&self, done_tx: &UnboundedSender<u64>, in_flight: &mut usize) {
        let Some(generation) = self.board.begin_cycle() else {
            debug!("Board inactive; cycle not started");
            return;
        };
        *in_flight += 1;

        let board = Arc::clone(&self.board);
        let aggregator = self.aggregator.clone();
        let symbols = Arc::clone(&self.symbols);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            run_generation(&board, &aggregator, &symbols, generation).await;
            // The control loop is gone after stop; nobody needs to hear about it.
            let _ = done_tx.send(generation);
        });
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    manual_tx: UnboundedSender<()>,
    task: JoinHandle<()>,
    board: Arc<QuoteBoard>,
}

impl SchedulerHandle {
    /// Request a cycle now, through the same path as a timer tick.
    pub fn refresh(&self) -> Result<(), TerminalError> {
        self.manual_tx
            .send(())
            .map_err(|_| TerminalError::ChannelSend("scheduler is stopped".to_string()))
    }

    /// `false` after `stop`, or if the control task has ended.
    pub fn is_running(&self) -> bool {
        self.board.is_active() && !self.task.is_finished()
    }

    /// Stop the timer and refuse all later commits, including those of cycles
    /// still in flight.
    pub fn stop(&self) {
        self.board.deactivate();
        self.task.abort();
        info!("Scheduler stopped");
    }
}
