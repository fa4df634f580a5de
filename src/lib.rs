//! stream_probe library: diagnostic HTTP/HTTPS probing
//!
//! This library performs a single diagnostic request against a URL and
//! reports everything a stream operator needs to know about it: every hop of
//! the redirect chain (walked manually, never by the HTTP client), the final
//! status and headers, and a size-bounded view of the body classified as a
//! playlist manifest, a media payload, a large file or ordinary text.
//!
//! Probes can be routed through an authenticated SOCKS5 proxy and can
//! override DNS for individual hostnames with hosts-file style text while
//! still reporting (and sending `Host` for) the original hostname.
//!
//! Bodies too long to inline are kept in an in-memory [`ResponseCache`] for a
//! single download.
//!
//! # Example
//!
//! ```no_run
//! use stream_probe::{probe, ProbeRequest, ResponseCache};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache = ResponseCache::default();
//!
//! let mut request = ProbeRequest::new("http://live.example.com/channel/index.m3u8");
//! request.host = "203.0.113.10 live.example.com".to_string();
//! request.max_redirects = 5;
//!
//! let result = probe(request, &cache).await;
//! println!(
//!     "{} -> {} ({} redirects, manifest: {})",
//!     result.url, result.final_url, result.redirect_count, result.is_manifest
//! );
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod cache;
pub mod classify;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
mod models;
pub mod server;
mod utils;

// Re-export public API
pub use cache::{CachedResponse, ResponseCache};
pub use config::{LogFormat, LogLevel, ServerConfig};
pub use error_handling::{CacheError, FailureKind, ProbeInputError};
pub use fetch::{probe, ProbeExecutor};
pub use models::{FileType, HeaderMap, ProbeRequest, ProbeResult, RedirectStep};
pub use server::start_server;
