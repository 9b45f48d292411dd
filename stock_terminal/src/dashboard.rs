//! Presentation-side controller.
//!
//! `Dashboard` owns the `ViewState`, reads the board, and turns user intents into
//! either view changes or scheduler requests. Rows are never cached: every call
//! to `rows` or `frame` projects the board's current snapshot afresh.
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use stock_common::Intent;
use stock_common::Result;
use stock_common::quote::Quote;
use stock_common::snapshot::RefreshStatus;
use stock_common::view::{SortKey, ViewState, project};
use tokio::sync::watch;

use crate::board::{BoardState, QuoteBoard};
use crate::scheduler::SchedulerHandle;

/// Everything a renderer needs for one screen.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Projected rows.
    pub rows: Vec<Quote>,
    /// Status of the current cycle.
    pub status: RefreshStatus,
    /// Time of the last successful commit.
    pub last_update: Option<DateTime<Utc>>,
    /// View the rows were projected with.
    pub view: ViewState,
    /// Quotes in the committed snapshot before filtering.
    pub total: usize,
}

impl Frame {
    /// Project `state` under `view`.
    pub fn from_state(state: &BoardState, view: &ViewState) -> Self {
        Frame {
            rows: project(&state.snapshot, view),
            status: state.status.clone(),
            last_update: state.last_update,
            view: view.clone(),
            total: state.snapshot.len(),
        }
    }
}

/// Controller wiring the view to the board and scheduler.
pub struct Dashboard {
    board: Arc<QuoteBoard>,
    scheduler: SchedulerHandle,
    view: ViewState,
}

impl Dashboard {
    /// Controller over `board`, refreshed by `scheduler`.
    pub fn new(board: Arc<QuoteBoard>, scheduler: SchedulerHandle) -> Self {
        Dashboard {
            board,
            scheduler,
            view: ViewState::default(),
        }
    }

    /// Replace the search term.
    pub fn on_search_change(&mut self, text: &str) {
        debug!("Search changed to {:?}", text);
        self.view.set_search(text);
    }

    /// Header click on `key`.
    pub fn on_sort_click(&mut self, key: SortKey) {
        self.view.click_sort(key);
        debug!("Sort is now {:?}", self.view.sort);
    }

    /// Ask the scheduler for an immediate cycle.
    pub fn on_manual_refresh(&self) -> Result<()> {
        info!("Manual refresh requested");
        self.scheduler.refresh()
    }

    /// Dispatch `intent`; `Break` means the user asked to leave.
    pub fn apply(&mut self, intent: Intent) -> Result<ControlFlow<()>> {
        match intent {
            Intent::SearchChanged(text) => self.on_search_change(&text),
            Intent::SortClicked(key) => self.on_sort_click(key),
            Intent::ManualRefresh => self.on_manual_refresh()?,
            Intent::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Current view intent.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Rows for the current snapshot and view.
    pub fn rows(&self) -> Vec<Quote> {
        project(&self.board.current().snapshot, &self.view)
    }

    /// Full screen state.
    pub fn frame(&self) -> Frame {
        Frame::from_state(&self.board.current(), &self.view)
    }

    /// Receiver notified on every board change.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.board.subscribe()
    }

    /// Stop refreshing. Results still in flight are discarded.
    pub fn shutdown(self) {
        self.scheduler.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::{Script, ScriptedSource, symbols};
    use crate::aggregator::{Aggregator, CommitPolicy};
    use crate::scheduler::{OverlapPolicy, RefreshScheduler};
    use std::time::Duration;
    use stock_common::view::{SortDirection, SortDirective};

    fn names(rows: &[Quote]) -> Vec<String> {
        rows.iter().map(|q| q.symbol().to_string()).collect()
    }

    async fn dashboard(source: Arc<ScriptedSource>, watch_list: &[&str]) -> Dashboard {
        let board = Arc::new(QuoteBoard::new());
        let aggregator =
            Aggregator::new(source, Duration::from_secs(10), CommitPolicy::AllOrNothing);
        let mut rx = board.subscribe();
        let handle = RefreshScheduler::new(
            Arc::clone(&board),
            aggregator,
            symbols(watch_list),
            Duration::from_secs(60),
            OverlapPolicy::Coalesce,
        )
        .start();
        // Wait for the first commit.
        rx.wait_for(|state| state.committed_generation() >= 1)
            .await
            .unwrap();
        Dashboard::new(board, handle)
    }

    fn market() -> Arc<ScriptedSource> {
        Arc::new(ScriptedSource::with(&[
            ("AAPL", Script::quote(190.5, 1.2, 0.63)),
            ("MSFT", Script::quote(410.0, -2.5, -0.61)),
            ("AMZN", Script::quote(180.0, 2.0, 1.1)),
        ]))
    }

    #[tokio::test]
    async fn intents_drive_search_and_sort() {
        let mut dashboard = dashboard(market(), &["AAPL", "MSFT", "AMZN"]).await;
        assert_eq!(names(&dashboard.rows()), vec!["AAPL", "MSFT", "AMZN"]);

        dashboard.apply(Intent::SearchChanged("a".into())).unwrap();
        assert_eq!(names(&dashboard.rows()), vec!["AAPL", "AMZN"]);

        dashboard.apply(Intent::SortClicked(SortKey::Price)).unwrap();
        assert_eq!(names(&dashboard.rows()), vec!["AMZN", "AAPL"]);

        dashboard.apply(Intent::SortClicked(SortKey::Price)).unwrap();
        assert_eq!(
            dashboard.view().sort,
            SortDirective::by(SortKey::Price, SortDirection::Descending)
        );
        assert_eq!(names(&dashboard.rows()), vec!["AAPL", "AMZN"]);

        dashboard.apply(Intent::SearchChanged(String::new())).unwrap();
        let frame = dashboard.frame();
        assert_eq!(names(&frame.rows), vec!["MSFT", "AAPL", "AMZN"]);
        assert_eq!(frame.total, 3);
        assert!(frame.last_update.is_some());

        dashboard.shutdown();
    }

    #[tokio::test]
    async fn manual_refresh_and_quit() {
        let source = market();
        let mut dashboard = dashboard(Arc::clone(&source), &["AAPL", "MSFT"]).await;
        let mut rx = dashboard.subscribe();

        source.set("AAPL", Script::quote(200.0, 10.7, 5.6));
        assert!(dashboard.apply(Intent::ManualRefresh).unwrap().is_continue());
        rx.wait_for(|state| state.committed_generation() >= 2)
            .await
            .unwrap();
        assert_eq!(dashboard.rows()[0].price, 200.0);

        assert!(dashboard.apply(Intent::Quit).unwrap().is_break());
        dashboard.shutdown();
    }

    #[tokio::test]
    async fn failed_refresh_keeps_rows_visible() {
        let source = market();
        let dashboard = dashboard(Arc::clone(&source), &["AAPL", "MSFT"]).await;
        let mut rx = dashboard.subscribe();

        source.set("MSFT", Script::Fail(crate::fetcher::FetchCause::Status(500)));
        dashboard.on_manual_refresh().unwrap();
        rx.wait_for(|state| state.committed_generation() >= 2)
            .await
            .unwrap();

        let frame = dashboard.frame();
        assert!(frame.status.error_message().is_some());
        assert_eq!(names(&frame.rows), vec!["AAPL", "MSFT"]);
        assert_eq!(frame.rows[0].price, 190.5);

        dashboard.shutdown();
    }
}
