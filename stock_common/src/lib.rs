//!
//! Common types and utilities shared by the stock terminal crates.
//!
//! This crate aggregates:
//! - `error`: unified error type `TerminalError` used across the workspace.
//! - `result`: handy `Result<T, TerminalError>` alias.
//! - `symbols`: ticker symbols and parsing helpers for the configured watch list.
//! - `quote`: the normalized `Quote` record and the raw upstream payload.
//! - `snapshot`: the committed quote table and the refresh status of a cycle.
//! - `view`: search/sort intent and the pure row projection.
//! - `intent`: user intents forwarded from the presentation layer.
//! - `endpoint`: quote API constants and small helpers.
#![warn(missing_docs)]
pub mod endpoint;
pub mod error;
pub mod intent;
pub mod quote;
pub mod result;
pub mod snapshot;
pub mod symbols;
pub mod view;

pub use error::TerminalError;
pub use intent::Intent;
pub use quote::Quote;
pub use result::Result;
pub use snapshot::{RefreshStatus, Snapshot};
pub use symbols::Symbol;
pub use view::{SortDirection, SortDirective, SortKey, ViewState};
