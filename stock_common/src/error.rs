//! Error types shared between the library and the terminal binary.
//!
//! The `TerminalError` enum unifies common failure cases for I/O, symbol parsing,
//! JSON decoding, configuration and channel communication, allowing crates to
//! propagate a single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared across the workspace.
#[derive(Error, Debug)]
pub enum TerminalError {
    /// I/O error originating from the standard library (files, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// A symbol or symbol list could not be parsed into `Symbol` values.
    #[error("Parse symbols error: {0}")]
    ParseSymbols(String),

    /// Failure while decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Missing or invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Channel send failed (e.g., the scheduler has stopped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),
}
