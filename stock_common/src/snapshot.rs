//! Committed quote table and refresh status.

use chrono::{DateTime, Utc};

use crate::quote::Quote;
use crate::symbols::Symbol;

/// Quotes from the most recently completed refresh cycle, in configured
/// symbol order.
///
/// A snapshot is built once and never edited; a refresh produces a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    quotes: Vec<Quote>,
    taken_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The snapshot every process starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of `quotes` completed at `taken_at`.
    pub fn new(quotes: Vec<Quote>, taken_at: DateTime<Utc>) -> Self {
        Snapshot {
            quotes,
            taken_at: Some(taken_at),
        }
    }

    /// Quotes in configured symbol order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// When the cycle that produced this snapshot finished; `None` for the
    /// initial empty snapshot.
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.taken_at
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// `true` when no quotes have been committed yet.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Look up the quote for `symbol`.
    pub fn get(&self, symbol: &Symbol) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.symbol() == symbol)
    }
}

/// State of the current refresh cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RefreshStatus {
    /// No cycle has run yet.
    #[default]
    Idle,
    /// A cycle is running.
    InFlight,
    /// The last cycle committed a snapshot at the given time.
    Succeeded(DateTime<Utc>),
    /// The last cycle failed; the previous snapshot is still shown.
    Failed(String),
}

impl RefreshStatus {
    /// `true` while a cycle is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RefreshStatus::InFlight)
    }

    /// Failure message of the last cycle, if it failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RefreshStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}
