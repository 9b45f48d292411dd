//! Ticker symbols and helpers for the configured watch list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::TerminalError;

/// Symbols shown when no watch list is configured.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "TM", "EADSY",
];

/// Ticker identifier for a tradable instrument.
///
/// Always non-empty and upper-case. Besides ASCII letters and digits, `.`, `-`
/// and `:` are accepted so exchange-prefixed (`BINANCE:BTCUSDT`) and share-class
/// (`BRK.B`) tickers can be configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// String form of the ticker, as sent to the quote endpoint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = TerminalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TerminalError::ParseSymbols("empty symbol".to_string()));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':')))
        {
            return Err(TerminalError::ParseSymbols(format!(
                "invalid character {bad:?} in symbol {trimmed:?}"
            )));
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Symbol {
    type Error = TerminalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait providing list parsing for symbols.
pub trait SymbolParser: Sized {
    /// Parses symbols from a single string.
    ///
    /// Symbols may be separated by commas, whitespace or new lines. Empty entries
    /// are skipped; any entry that is not a valid symbol fails the whole list.
    fn parse_list(text: &str) -> Result<Vec<Self>, TerminalError>;

    /// Parses symbols from a buffered reader, line by line, with the same
    /// separator rules as [`SymbolParser::parse_list`].
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, TerminalError>;
}

impl SymbolParser for Symbol {
    fn parse_list(text: &str) -> Result<Vec<Self>, TerminalError> {
        text.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }

    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, TerminalError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(TerminalError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            symbols.extend(Self::parse_list(trimmed_line)?);
        }
        Ok(symbols)
    }
}

/// The built-in watch list, in display order.
pub fn default_symbols() -> Vec<Symbol> {
    DEFAULT_SYMBOLS
        .iter()
        .map(|s| Symbol(s.to_string()))
        .collect()
}

/// Drops repeated symbols, keeping the first occurrence so the configured order
/// is preserved.
pub fn dedup_symbols(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut seen = std::collections::HashSet::new();
    symbols
        .into_iter()
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}
