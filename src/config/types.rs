//! Configuration types.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing and for configuring the HTTP service.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    CACHE_SWEEP_INTERVAL, CACHE_TTL, DEFAULT_BIND_ADDRESS, DEFAULT_SERVER_PORT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration for the probe HTTP service.
///
/// # Examples
///
/// ```no_run
/// use stream_probe::ServerConfig;
///
/// let config = ServerConfig {
///     port: 9000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_address: String,

    /// Port to listen on (0 picks a free port)
    pub port: u16,

    /// How long cached bodies stay downloadable
    pub cache_ttl: Duration,

    /// How often expired cache entries are purged
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_SERVER_PORT,
            cache_ttl: CACHE_TTL,
            sweep_interval: CACHE_SWEEP_INTERVAL,
        }
    }
}
