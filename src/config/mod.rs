//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, size limits, cache lifetimes)
//! - Logging and service configuration types
//! - Command-line options for the `stream_probe` binary

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, ProbeArgs, ServeArgs};
pub use constants::*;
pub use types::{LogFormat, LogLevel, ServerConfig};
