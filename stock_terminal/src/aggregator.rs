//! One refresh cycle: fetch every symbol concurrently, then decide.
//!
//! All fetches are started together and joined only once every one of them has
//! settled, so a slow or failing symbol never cancels its siblings. Each fetch is
//! bounded by `fetch_timeout`. The outcome is a whole `Snapshot` in configured
//! symbol order, or a `CycleError`; nothing in between is ever handed out.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::ValueEnum;
use futures::future::join_all;
use log::{debug, warn};
use stock_common::quote::Quote;
use stock_common::snapshot::Snapshot;
use stock_common::symbols::Symbol;
use thiserror::Error;
use tokio::time::timeout;

use crate::fetcher::{FetchCause, FetchError, QuoteSource};

/// What a cycle does when some symbols fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CommitPolicy {
    /// Any failed symbol fails the whole cycle.
    #[default]
    AllOrNothing,
    /// Commit the symbols that succeeded; fail only when none did.
    Partial,
}

/// Why a cycle produced no snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    /// The watch list is empty.
    #[error("no symbols configured")]
    NoSymbols,
    /// One or more symbols failed under the active policy.
    #[error("{} of {} symbols failed: {}", .failures.len(), .total, summarize(.failures))]
    Fetch {
        /// Every failed symbol, in configured order.
        failures: Vec<FetchError>,
        /// Symbols attempted in the cycle.
        total: usize,
    },
}

fn summarize(failures: &[FetchError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs refresh cycles against a `QuoteSource`.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn QuoteSource>,
    fetch_timeout: Duration,
    policy: CommitPolicy,
}

impl Aggregator {
    /// Aggregator over `source` with a per-symbol `fetch_timeout`.
    pub fn new(source: Arc<dyn QuoteSource>, fetch_timeout: Duration, policy: CommitPolicy) -> Self {
        Aggregator {
            source,
            fetch_timeout,
            policy,
        }
    }

    /// Fetch all `symbols` and build a snapshot in the same order.
    pub async fn run_cycle(&self, symbols: &[Symbol]) -> Result<Snapshot, CycleError> {
        if symbols.is_empty() {
            return Err(CycleError::NoSymbols);
        }

        // join_all yields outcomes in input order regardless of completion order.
        let outcomes = join_all(symbols.iter().map(|symbol| self.fetch_bounded(symbol))).await;

        let mut quotes: Vec<Quote> = Vec::with_capacity(symbols.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    warn!("Quote fetch failed: {}", e);
                    failures.push(e);
                }
            }
        }

        let total = symbols.len();
        match self.policy {
            CommitPolicy::AllOrNothing if !failures.is_empty() => {
                Err(CycleError::Fetch { failures, total })
            }
            CommitPolicy::Partial if quotes.is_empty() => Err(CycleError::Fetch { failures, total }),
            _ => {
                if !failures.is_empty() {
                    warn!(
                        "Committing {} of {} symbols; skipped: {}",
                        quotes.len(),
                        total,
                        failures
                            .iter()
                            .map(|f| f.symbol.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                debug!("Cycle collected {} quotes", quotes.len());
                Ok(Snapshot::new(quotes, Utc::now()))
            }
        }
    }

    async fn fetch_bounded(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        match timeout(self.fetch_timeout, self.source.fetch(symbol)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::new(
                symbol.clone(),
                FetchCause::Timeout(self.fetch_timeout),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stock_common::quote::RawQuote;
    use stock_common::view::{SortDirection, SortDirective, SortKey, ViewState, project};

    /// Scripted outcome for one symbol.
    #[derive(Clone)]
    pub(crate) enum Script {
        Quote { price: f64, change: f64, percent_change: f64, delay: Duration },
        Fail(FetchCause),
        Hang,
    }

    impl Script {
        pub(crate) fn quote(price: f64, change: f64, percent_change: f64) -> Self {
            Script::Quote { price, change, percent_change, delay: Duration::ZERO }
        }

        pub(crate) fn delayed(price: f64, delay: Duration) -> Self {
            Script::Quote { price, change: 0.0, percent_change: 0.0, delay }
        }
    }

    /// In-process `QuoteSource` driven by a per-symbol script.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        scripts: Mutex<HashMap<String, Script>>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub(crate) fn with(entries: &[(&str, Script)]) -> Self {
            let source = ScriptedSource::default();
            for (symbol, script) in entries {
                source.set(symbol, script.clone());
            }
            source
        }

        pub(crate) fn set(&self, symbol: &str, script: Script) {
            self.scripts.lock().unwrap().insert(symbol.to_string(), script);
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .get(symbol.as_str())
                .cloned()
                .unwrap_or(Script::Fail(FetchCause::Status(404)));
            match script {
                Script::Quote { price, change, percent_change, delay } => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(Quote::from_raw(
                        symbol.clone(),
                        RawQuote {
                            current: Some(price),
                            change: Some(change),
                            percent_change: Some(percent_change),
                            ..RawQuote::default()
                        },
                    ))
                }
                Script::Fail(cause) => Err(FetchError::new(symbol.clone(), cause)),
                Script::Hang => std::future::pending().await,
            }
        }
    }

    pub(crate) fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn names(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.quotes().iter().map(|q| q.symbol().as_str()).collect()
    }

    fn aggregator(source: ScriptedSource, policy: CommitPolicy) -> Aggregator {
        Aggregator::new(Arc::new(source), Duration::from_secs(10), policy)
    }

    #[tokio::test]
    async fn aapl_msft_end_to_end() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::quote(190.5, 1.2, 0.63)),
            ("MSFT", Script::quote(410.0, -2.5, -0.61)),
        ]);
        let snapshot = aggregator(source, CommitPolicy::AllOrNothing)
            .run_cycle(&symbols(&["AAPL", "MSFT"]))
            .await
            .unwrap();

        assert_eq!(names(&snapshot), vec!["AAPL", "MSFT"]);
        assert!(snapshot.taken_at().is_some());

        let view = ViewState {
            sort: SortDirective::by(SortKey::PercentChange, SortDirection::Descending),
            ..ViewState::default()
        };
        let rows: Vec<String> = project(&snapshot, &view)
            .iter()
            .map(|q| q.symbol().to_string())
            .collect();
        assert_eq!(rows, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_configured_order_not_completion_order() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::delayed(1.0, Duration::from_millis(300))),
            ("MSFT", Script::delayed(2.0, Duration::from_millis(100))),
            ("NVDA", Script::delayed(3.0, Duration::from_millis(200))),
        ]);
        let snapshot = aggregator(source, CommitPolicy::AllOrNothing)
            .run_cycle(&symbols(&["AAPL", "MSFT", "NVDA"]))
            .await
            .unwrap();
        assert_eq!(names(&snapshot), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_run_concurrently() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::delayed(1.0, Duration::from_secs(5))),
            ("MSFT", Script::delayed(2.0, Duration::from_secs(5))),
            ("NVDA", Script::delayed(3.0, Duration::from_secs(5))),
        ]);
        let started = tokio::time::Instant::now();
        aggregator(source, CommitPolicy::AllOrNothing)
            .run_cycle(&symbols(&["AAPL", "MSFT", "NVDA"]))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn one_failure_fails_the_cycle_and_reports_every_failure() {
        let source = Arc::new(ScriptedSource::with(&[
            ("AAPL", Script::quote(190.5, 1.2, 0.63)),
            ("MSFT", Script::Fail(FetchCause::Status(500))),
            ("NVDA", Script::quote(900.0, 3.0, 0.3)),
        ]));
        let aggregator = Aggregator::new(
            source.clone(),
            Duration::from_secs(10),
            CommitPolicy::AllOrNothing,
        );
        let err = aggregator
            .run_cycle(&symbols(&["AAPL", "MSFT", "NVDA"]))
            .await
            .unwrap_err();

        // Every symbol was still attempted.
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        match err {
            CycleError::Fetch { failures, total } => {
                assert_eq!(total, 3);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].symbol.as_str(), "MSFT");
                assert_eq!(failures[0].cause, FetchCause::Status(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_counts_like_transport_failure() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::Fail(FetchCause::Malformed("expected value".into()))),
            ("MSFT", Script::quote(410.0, -2.5, -0.61)),
        ]);
        let err = aggregator(source, CommitPolicy::AllOrNothing)
            .run_cycle(&symbols(&["AAPL", "MSFT"]))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("1 of 2 symbols failed: AAPL: malformed response"));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_fetch_times_out_and_fails_the_cycle() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::quote(190.5, 1.2, 0.63)),
            ("MSFT", Script::Hang),
        ]);
        let aggregator = Aggregator::new(
            Arc::new(source),
            Duration::from_secs(10),
            CommitPolicy::AllOrNothing,
        );
        let started = tokio::time::Instant::now();
        let err = aggregator
            .run_cycle(&symbols(&["AAPL", "MSFT"]))
            .await
            .unwrap_err();

        assert!(started.elapsed() >= Duration::from_secs(10));
        assert!(started.elapsed() < Duration::from_secs(11));
        match err {
            CycleError::Fetch { failures, .. } => {
                assert_eq!(failures[0].symbol.as_str(), "MSFT");
                assert_eq!(failures[0].cause, FetchCause::Timeout(Duration::from_secs(10)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_watch_list_is_rejected() {
        let err = aggregator(ScriptedSource::default(), CommitPolicy::AllOrNothing)
            .run_cycle(&[])
            .await
            .unwrap_err();
        assert_eq!(err, CycleError::NoSymbols);
    }

    #[tokio::test]
    async fn partial_policy_commits_survivors_in_order() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::quote(190.5, 1.2, 0.63)),
            ("MSFT", Script::Fail(FetchCause::Status(503))),
            ("NVDA", Script::quote(900.0, 3.0, 0.3)),
        ]);
        let snapshot = aggregator(source, CommitPolicy::Partial)
            .run_cycle(&symbols(&["AAPL", "MSFT", "NVDA"]))
            .await
            .unwrap();
        assert_eq!(names(&snapshot), vec!["AAPL", "NVDA"]);
    }

    #[tokio::test]
    async fn partial_policy_still_fails_when_nothing_succeeds() {
        let source = ScriptedSource::with(&[
            ("AAPL", Script::Fail(FetchCause::Status(503))),
            ("MSFT", Script::Fail(FetchCause::Transport("reset".into()))),
        ]);
        let err = aggregator(source, CommitPolicy::Partial)
            .run_cycle(&symbols(&["AAPL", "MSFT"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CycleError::Fetch { ref failures, total: 2 } if failures.len() == 2));
    }
}
