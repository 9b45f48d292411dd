//! Stock Terminal: fetches quotes for a watch list from Finnhub, refreshes them on a
//! fixed interval, and shows them as a searchable, sortable table.
//!
//! Usage example (CLI):
//! ```bash
//! FINNHUB_API_KEY=... stock_terminal --symbols AAPL,MSFT,NVDA --interval-secs 30
//! ```
//!
//! While running, type `/text` to search, `s <column>` to sort, `r` to refresh
//! and `q` to quit. See `stock_common::intent` for details.
use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use stock_common::snapshot::RefreshStatus;
use stock_common::view::ViewState;
use stock_common::{Intent, Result, TerminalError};
use stock_terminal::aggregator::Aggregator;
use stock_terminal::args::Args;
use stock_terminal::board::QuoteBoard;
use stock_terminal::config::TerminalConfig;
use stock_terminal::dashboard::{Dashboard, Frame};
use stock_terminal::fetcher::FinnhubClient;
use stock_terminal::render::render;
use stock_terminal::scheduler::{RefreshScheduler, refresh_once};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logger();
    let args = Args::parse();
    let config = TerminalConfig::from_args(&args)?;
    info!(
        "Watching {} symbols: {:?}",
        config.symbols.len(),
        config.symbols.iter().map(|s| s.as_str()).collect::<Vec<_>>()
    );

    let client = FinnhubClient::new(&config.base_url, &config.api_key, config.fetch_timeout)?;
    let aggregator = Aggregator::new(Arc::new(client), config.fetch_timeout, config.policy);

    if config.once {
        return run_once(&config, &aggregator).await;
    }
    run_dashboard(config, aggregator).await
}

async fn run_once(config: &TerminalConfig, aggregator: &Aggregator) -> Result<()> {
    let board = QuoteBoard::new();
    refresh_once(&board, aggregator, &config.symbols).await;

    let state = board.current();
    println!("{}", render(&Frame::from_state(&state, &ViewState::default()), config.interval));
    if let RefreshStatus::Failed(message) = state.status {
        return Err(TerminalError::Format(message));
    }
    Ok(())
}

async fn run_dashboard(config: TerminalConfig, aggregator: Aggregator) -> Result<()> {
    let (quit_tx, mut quit_rx) = mpsc::unbounded_channel::<()>();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        let _ = quit_tx.send(());
    })
    .map_err(|e| TerminalError::Config(format!("failed to set Ctrl+C handler: {e}")))?;

    let board = Arc::new(QuoteBoard::new());
    let scheduler = RefreshScheduler::new(
        Arc::clone(&board),
        aggregator,
        config.symbols.clone(),
        config.interval,
        config.overlap,
    )
    .start();
    let mut dashboard = Dashboard::new(board, scheduler);
    let mut updates = dashboard.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    draw(&dashboard, &config)?;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&dashboard, &config)?;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => draw(&dashboard, &config)?,
                Ok(Some(line)) => match line.parse::<Intent>() {
                    Ok(intent) => {
                        if let ControlFlow::Break(()) = dashboard.apply(intent)? {
                            break;
                        }
                        draw(&dashboard, &config)?;
                    }
                    Err(e) => warn!("Ignoring input {:?}: {}", line.trim(), e),
                },
                Ok(None) => {
                    info!("Input closed; press Ctrl+C to exit");
                    stdin_open = false;
                }
                Err(e) => {
                    error!("Reading input failed: {}", e);
                    stdin_open = false;
                }
            },
            _ = quit_rx.recv() => break,
        }
    }

    dashboard.shutdown();
    info!("Stock terminal stopped");
    Ok(())
}

fn draw(dashboard: &Dashboard, config: &TerminalConfig) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{}\n> ", render(&dashboard.frame(), config.interval))?;
    stdout.flush()?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
