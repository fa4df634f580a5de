//! Probe execution.
//!
//! This module provides:
//! - The per-probe executor that walks the redirect chain manually
//! - Hosts override parsing and URL rewriting
//! - `Location` resolution for the next hop
//! - Request header construction and response header capture
//! - Final-hop body capture and packaging
//! - SOCKS5 proxy configuration

mod body;
mod executor;
mod hosts;
mod package;
mod proxy;
mod redirects;
mod request;

// Re-export public API
pub use executor::{prepare_hop_url, probe, ProbeExecutor};
pub use hosts::{apply_override, parse_hosts_map, rewrite_to_ip, HostOverride, HostsMap};
pub use proxy::{ProxyAuth, ProxyConfig};
pub use redirects::resolve_location;
