//! Cached response bodies and download naming.

use std::time::{Duration, Instant};

use crate::classify::{content_type, is_manifest_content_type};
use crate::models::HeaderMap;

/// Content-type served for playlist downloads.
const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
/// Content-type served when the origin did not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A full response body held for a single download.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Full body bytes
    pub body: Vec<u8>,
    /// Headers captured with the body (lower-cased names)
    pub headers: HeaderMap,
    created_at: Instant,
}

impl CachedResponse {
    pub(crate) fn new(body: Vec<u8>, headers: HeaderMap) -> Self {
        Self {
            body,
            headers,
            created_at: Instant::now(),
        }
    }

    pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    /// Attachment filename derived from the captured content-type.
    ///
    /// | content-type            | filename            |
    /// |-------------------------|---------------------|
    /// | HLS playlist types      | `playlist.m3u8`     |
    /// | `video/<sub>`           | `video.<sub>`       |
    /// | `audio/<sub>`           | `audio.<sub>`       |
    /// | `application/json`      | `response.json`     |
    /// | `text/html`             | `response.html`     |
    /// | `text/plain`            | `response.txt`      |
    /// | anything else           | `downloaded_file`   |
    pub fn download_filename(&self) -> String {
        let content_type = content_type(&self.headers);

        if is_manifest_content_type(&content_type) {
            return "playlist.m3u8".to_string();
        }
        for family in ["video", "audio"] {
            if let Some(subtype) = mime_subtype(&content_type, family) {
                let extension = if subtype == "x-mpegurl" { "m3u8" } else { &subtype };
                return format!("{}.{}", family, extension);
            }
        }
        if content_type.contains("application/json") {
            "response.json".to_string()
        } else if content_type.contains("text/html") {
            "response.html".to_string()
        } else if content_type.contains("text/plain") {
            "response.txt".to_string()
        } else {
            "downloaded_file".to_string()
        }
    }

    /// Content-type to serve the download with.
    pub fn download_content_type(&self) -> String {
        let content_type = content_type(&self.headers);
        if is_manifest_content_type(&content_type) {
            PLAYLIST_CONTENT_TYPE.to_string()
        } else {
            self.headers
                .get("content-type")
                .cloned()
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
        }
    }
}

/// Subtype of `family/<subtype>; params`, stripped of parameters and any
/// characters unsafe in a filename.
fn mime_subtype(content_type: &str, family: &str) -> Option<String> {
    let rest = content_type.strip_prefix(family)?.strip_prefix('/')?;
    let subtype: String = rest
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'))
        .collect();
    (!subtype.is_empty()).then_some(subtype)
}
