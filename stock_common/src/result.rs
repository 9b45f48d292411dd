//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `TerminalError`, so functions can simply return `Result<T>`.
use crate::error::TerminalError;

/// Workspace-wide `Result` alias with `TerminalError` as the default error.
pub type Result<T, E = TerminalError> = std::result::Result<T, E>;
