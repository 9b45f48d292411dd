//! Validated runtime configuration built from `Args`.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use stock_common::symbols::{Symbol, SymbolParser, dedup_symbols, default_symbols};
use stock_common::{Result, TerminalError};

use crate::aggregator::CommitPolicy;
use crate::args::Args;
use crate::scheduler::OverlapPolicy;

/// Everything the terminal needs to run.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// API token; never logged.
    pub api_key: String,
    /// Symbols in display order, without duplicates.
    pub symbols: Vec<Symbol>,
    /// Time between automatic refreshes.
    pub interval: Duration,
    /// Bound on a single quote request.
    pub fetch_timeout: Duration,
    /// Base URL of the quote API.
    pub base_url: String,
    /// Trigger handling while a cycle runs.
    pub overlap: OverlapPolicy,
    /// Partial-failure handling.
    pub policy: CommitPolicy,
    /// Single cycle, then exit.
    pub once: bool,
}

impl TerminalConfig {
    /// Validate `args` and resolve the symbol list.
    pub fn from_args(args: &Args) -> Result<Self> {
        let api_key = args.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(TerminalError::Config("API key must not be empty".to_string()));
        }
        if args.interval_secs == 0 {
            return Err(TerminalError::Config(
                "--interval-secs must be greater than zero".to_string(),
            ));
        }
        if args.timeout_secs == 0 {
            return Err(TerminalError::Config(
                "--timeout-secs must be greater than zero".to_string(),
            ));
        }

        let symbols = dedup_symbols(resolve_symbols(args)?);
        if symbols.is_empty() {
            return Err(TerminalError::Config("no symbols to watch".to_string()));
        }

        Ok(TerminalConfig {
            api_key,
            symbols,
            interval: Duration::from_secs(args.interval_secs),
            fetch_timeout: Duration::from_secs(args.timeout_secs),
            base_url: args.base_url.trim().to_string(),
            overlap: args.overlap,
            policy: args.policy,
            once: args.once,
        })
    }
}

fn resolve_symbols(args: &Args) -> Result<Vec<Symbol>> {
    let listed: Vec<&str> = args
        .symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !listed.is_empty() {
        return listed.into_iter().map(str::parse).collect();
    }

    if let Some(raw) = &args.symbols_file {
        let path = normalize_path(raw);
        info!("Reading symbols from {}", path.display());
        return read_symbols(&path);
    }

    warn!("No symbols configured; using the default watch list");
    Ok(default_symbols())
}

fn read_symbols(path: &Path) -> Result<Vec<Symbol>> {
    if !path.is_file() {
        return Err(TerminalError::Config(format!(
            "symbols file not found: {}",
            path.display()
        )));
    }
    let file = File::open(path)?;
    Symbol::parse_from_reader(BufReader::new(file))
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["stock_terminal", "--api-key", "secret"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn names(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(Symbol::as_str).collect()
    }

    #[test]
    fn symbols_flag_is_normalized_and_deduplicated() {
        let config = TerminalConfig::from_args(&args(&["--symbols", "msft, aapl,MSFT,tm"])).unwrap();
        assert_eq!(names(&config.symbols), vec!["MSFT", "AAPL", "TM"]);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn rejects_blank_key_and_zero_durations() {
        let mut blank = args(&["--symbols", "AAPL"]);
        blank.api_key = "  ".to_string();
        assert!(matches!(TerminalConfig::from_args(&blank), Err(TerminalError::Config(_))));

        for flag in ["--interval-secs", "--timeout-secs"] {
            let zero = args(&["--symbols", "AAPL", flag, "0"]);
            assert!(matches!(TerminalConfig::from_args(&zero), Err(TerminalError::Config(_))));
        }
    }

    #[test]
    fn rejects_invalid_symbol() {
        assert!(TerminalConfig::from_args(&args(&["--symbols", "AAPL,$$$"])).is_err());
    }

    #[test]
    fn reads_symbols_file() {
        let path = std::env::temp_dir().join(format!("stock_terminal_{}.txt", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "# watch list\nnvda, jpm\n\neadsy nvda").unwrap();
        }
        let quoted = format!("\"{}\"", path.display());
        let result = TerminalConfig::from_args(&args(&["--symbols-file", &quoted]));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(names(&result.unwrap().symbols), vec!["NVDA", "JPM", "EADSY"]);
    }

    #[test]
    fn missing_symbols_file_is_config_error() {
        let result = TerminalConfig::from_args(&args(&["--symbols-file", "/nonexistent/watch.txt"]));
        assert!(matches!(result, Err(TerminalError::Config(_))));
    }

    #[test]
    fn normalize_path_strips_quotes() {
        assert_eq!(normalize_path("  \"C:\\quotes\\list.txt\" "), PathBuf::from("C:\\quotes\\list.txt"));
        assert_eq!(normalize_path("list.txt"), PathBuf::from("list.txt"));
    }
}
