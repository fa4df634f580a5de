//! Probe resource setup.
//!
//! This module provides functions to initialize the shared pieces a probe or
//! the service needs:
//! - Logger (plain or JSON)
//! - Per-probe HTTP client (timeouts, proxy, redirects disabled)
//! - Hosts-override-aware DNS resolver
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::init_probe_client;
pub use logger::init_logger_with;
pub use resolver::HostsResolver;
