//! Live stock quote dashboard for the terminal.
//!
//! The pipeline, from the network to the screen:
//! - `fetcher`: one HTTP request per symbol behind the `QuoteSource` trait.
//! - `aggregator`: concurrent fetch of the whole watch list into one `Snapshot`.
//! - `board`: the observable committed state (`QuoteBoard`).
//! - `scheduler`: timer and manual refresh cycles with overlap handling.
//! - `dashboard`: view state and user intents.
//! - `render`: plain-text table.
//!
//! `args` and `config` turn the command line into a validated `TerminalConfig`.
#![warn(missing_docs)]
pub mod aggregator;
pub mod args;
pub mod board;
pub mod config;
pub mod dashboard;
pub mod fetcher;
pub mod render;
pub mod scheduler;
