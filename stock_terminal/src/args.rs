//! Command-line arguments for the stock terminal.
//!
//! This module defines the CLI interface using `clap`. Every flag that carries a
//! secret or a list can also come from the environment (or a `.env` file). See
//! `config` for validation.
use clap::Parser;
use stock_common::endpoint::{
    API_KEY_ENV, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_REFRESH_INTERVAL_SECS, FINNHUB_BASE_URL,
};

use crate::aggregator::CommitPolicy;
use crate::scheduler::OverlapPolicy;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Finnhub API key.
    #[clap(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: String,

    /// Comma-separated symbols to watch, in display order.
    #[clap(long, env = "STOCK_TERMINAL_SYMBOLS", value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Path to a text file with symbols to watch.
    /// Symbols may be separated by commas, spaces, or new lines; `#` starts a comment line.
    #[clap(long, conflicts_with = "symbols")]
    pub symbols_file: Option<String>,

    /// Seconds between automatic refreshes.
    #[clap(long, default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Upper bound in seconds for a single quote request.
    #[clap(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Base URL of the quote API.
    #[clap(long, default_value = FINNHUB_BASE_URL)]
    pub base_url: String,

    /// What to do with a refresh request while a cycle is running.
    #[clap(long, value_enum, default_value_t = OverlapPolicy::Coalesce)]
    pub overlap: OverlapPolicy,

    /// Whether one failed symbol fails the whole refresh.
    #[clap(long, value_enum, default_value_t = CommitPolicy::AllOrNothing)]
    pub policy: CommitPolicy,

    /// Fetch once, print the table and exit.
    #[clap(long)]
    pub once: bool,
}
