//! User intents forwarded from the presentation layer.
//!
//! An `Intent` is either a change to the view (search text, header click), a
//! request for an immediate refresh, or a request to leave. The terminal reads
//! them from input lines:
//!
//! - `/text`: search for `text` (a bare `/` clears the search)
//! - `s <column>` or `sort <column>`: click a column header
//! - `r` or `refresh`: manual refresh
//! - `q`, `quit` or `exit`: leave
use std::str::FromStr;

use crate::error::TerminalError;
use crate::view::SortKey;

/// Prefix that introduces a search term.
pub const SEARCH_PREFIX: char = '/';

/// Action requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Replace the search term.
    SearchChanged(String),
    /// Header click on a sortable column.
    SortClicked(SortKey),
    /// Run a refresh cycle now.
    ManualRefresh,
    /// Stop the dashboard.
    Quit,
}

impl FromStr for Intent {
    type Err = TerminalError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();
        if let Some(term) = trimmed.strip_prefix(SEARCH_PREFIX) {
            return Ok(Intent::SearchChanged(term.trim().to_string()));
        }

        let mut words = trimmed.split_whitespace();
        let command = words
            .next()
            .ok_or_else(|| TerminalError::Format("empty input".to_string()))?
            .to_ascii_lowercase();

        match command.as_str() {
            "r" | "refresh" => Ok(Intent::ManualRefresh),
            "q" | "quit" | "exit" => Ok(Intent::Quit),
            "s" | "sort" => {
                let column = words.next().ok_or_else(|| {
                    TerminalError::Format("sort needs a column: symbol, price, change, pct".into())
                })?;
                let key = column
                    .parse::<SortKey>()
                    .map_err(|_| TerminalError::Format(format!("unknown column: {column}")))?;
                Ok(Intent::SortClicked(key))
            }
            other => Err(TerminalError::Format(format!("unknown command: {other}"))),
        }
    }
}
