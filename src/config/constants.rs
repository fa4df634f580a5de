//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the probe,
//! including timeouts, size limits, cache lifetimes and request defaults.

use std::time::Duration;

// Request bounds
/// Default total per-hop timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Lower bound for a caller-supplied timeout
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Upper bound for a caller-supplied timeout
pub const MAX_TIMEOUT_SECS: u64 = 120;
/// TCP connection timeout in seconds.
/// Applies inside the total timeout so unreachable hosts fail fast.
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

// Redirect handling
/// Default number of redirect hops to follow
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
/// Upper bound for a caller-supplied redirect limit
pub const MAX_REDIRECTS_LIMIT: usize = 50;

/// Default HTTP method when the caller does not provide one
pub const DEFAULT_METHOD: &str = "GET";

/// Default User-Agent string for probe requests.
///
/// Only sent when the caller's header map carries no `User-Agent` of its own.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Content codings advertised when the caller sets no `Accept-Encoding`.
///
/// Exactly the codings the body capture can decode.
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, br";

// Response and body size limits
/// Bodies (declared or observed) above this size are treated as large files (2MB).
/// Large non-manifest bodies are summarized instead of returned.
pub const LARGE_BODY_THRESHOLD: usize = 2 * 1024 * 1024;
/// Maximum number of characters returned inline in a probe result.
/// Longer generic bodies are truncated and offered for download.
pub const INLINE_BODY_LIMIT: usize = 2000;

// Synthetic status codes
/// Status reported when the probe input itself is unusable
pub const STATUS_MALFORMED_INPUT: u16 = 400;
/// Status reported for transport failures (timeouts, refused connections, DNS)
pub const STATUS_TRANSPORT_FAILURE: u16 = 504;

// Response cache
/// How long a cached body stays downloadable (5 minutes)
pub const CACHE_TTL: Duration = Duration::from_secs(300);
/// How often the background sweeper purges expired entries
pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Maximum number of bodies held at once
pub const CACHE_MAX_ENTRIES: usize = 256;
/// Maximum total bytes held across all cached bodies (256MB)
pub const CACHE_MAX_TOTAL_BYTES: usize = 256 * 1024 * 1024;
/// Path prefix under which cached bodies are served
pub const DOWNLOAD_PATH_PREFIX: &str = "/download/";

// HTTP service
/// Default bind address for `stream_probe serve`
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
/// Default port for `stream_probe serve`
pub const DEFAULT_SERVER_PORT: u16 = 8090;

/// Maximum error message length in characters.
/// Error text becomes the probe body, so it is bounded like any other body.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
