//! Response content classification.
//!
//! Three independent detectors decide whether a response is a playlist
//! manifest, a media payload, or a large body. Manifest detection takes
//! precedence: a manifest is never reported as media, even when its URL or
//! content-type would match the media heuristics.

use url::Url;

use crate::config::LARGE_BODY_THRESHOLD;
use crate::models::{FileType, HeaderMap};

#[cfg(test)]
mod tests;

/// First line of every HLS / extended M3U playlist.
pub const MANIFEST_MARKER: &str = "#EXTM3U";

/// URL path suffixes that identify playlist manifests.
pub const MANIFEST_EXTENSIONS: &[&str] = &[".m3u8", ".m3u"];

/// Content-types that identify playlist manifests (matched as substrings).
pub const MANIFEST_CONTENT_TYPES: &[&str] = &[
    "application/x-mpegurl",
    "application/vnd.apple.mpegurl",
    "audio/x-mpegurl",
    "audio/mpegurl",
];

/// URL path suffixes that identify media payloads.
///
/// Manifest extensions are deliberately absent; `.mpd` (DASH) is treated as
/// media because its body is not shown inline.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    // Video containers
    ".flv", ".mp4", ".m4v", ".mov", ".avi", ".wmv", ".mkv", ".webm", ".ts", ".mts", ".m2ts",
    ".3gp", ".3g2", ".f4v", ".vob", ".ogv", ".divx",
    // Audio containers
    ".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".wma",
    // Streaming descriptors
    ".mpd",
];

/// Outcome of classifying one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Playlist manifest
    pub is_manifest: bool,
    /// Media payload (always false for manifests)
    pub is_media: bool,
    /// Declared or captured body above the large-file threshold
    pub is_large: bool,
}

impl Classification {
    /// Whether the inline body is replaced by a summary.
    pub fn skips_body(&self) -> bool {
        !self.is_manifest && (self.is_media || self.is_large)
    }

    /// Coarse file type for reporting.
    pub fn file_type(&self) -> FileType {
        if self.is_manifest {
            FileType::Manifest
        } else if self.is_media {
            FileType::Media
        } else if self.is_large {
            FileType::LargeFile
        } else {
            FileType::Generic
        }
    }
}

/// Everything the classifier looks at for one response.
#[derive(Debug, Clone, Copy)]
pub struct ContentProbe<'a> {
    /// URL the probe started from
    pub original_url: &'a str,
    /// URL of the final hop
    pub final_url: &'a str,
    /// Final response headers (lower-cased names)
    pub headers: &'a HeaderMap,
    /// Captured body bytes (possibly only a prefix)
    pub body: &'a [u8],
}

/// Classifies a response with manifest precedence.
///
/// Manifest URL detection looks at the final URL only; media URL detection
/// looks at both the original and the final URL.
pub fn classify(probe: &ContentProbe<'_>) -> Classification {
    let content_type = content_type(probe.headers);

    let is_manifest = is_manifest_url(probe.final_url)
        || is_manifest_content_type(&content_type)
        || manifest_marker(probe.body) == Some(true);

    let is_media = !is_manifest
        && (is_media_url(probe.original_url)
            || is_media_url(probe.final_url)
            || is_media_content_type(&content_type));

    let is_large = is_large_body(declared_length(probe.headers), probe.body.len());

    Classification {
        is_manifest,
        is_media,
        is_large,
    }
}

/// Lower-cased `content-type` header value, or an empty string.
pub fn content_type(headers: &HeaderMap) -> String {
    headers
        .get("content-type")
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Declared `content-length`, when present and numeric.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-length")
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// Large-body rule: declared length or captured length above the threshold.
pub fn is_large_body(declared: Option<u64>, captured: usize) -> bool {
    declared.is_some_and(|len| len > LARGE_BODY_THRESHOLD as u64) || captured > LARGE_BODY_THRESHOLD
}

/// Whether the URL path ends in a manifest extension.
pub fn is_manifest_url(url: &str) -> bool {
    path_has_suffix(url, MANIFEST_EXTENSIONS)
}

/// Whether the URL path ends in a media extension.
pub fn is_media_url(url: &str) -> bool {
    path_has_suffix(url, MEDIA_EXTENSIONS)
}

/// Whether a (lower-cased) content-type names a manifest.
pub fn is_manifest_content_type(content_type: &str) -> bool {
    MANIFEST_CONTENT_TYPES
        .iter()
        .any(|manifest| content_type.contains(manifest))
}

/// Whether a (lower-cased) content-type names a media payload.
///
/// Manifest content-types (`audio/x-mpegurl` included) never count as media.
pub fn is_media_content_type(content_type: &str) -> bool {
    if is_manifest_content_type(content_type) {
        return false;
    }
    content_type.starts_with("video/") || content_type.starts_with("audio/")
}

/// Decides whether a body prefix carries the manifest marker.
///
/// Leading whitespace is skipped. Returns `None` while the prefix is still
/// too short to decide (empty, or a strict prefix of the marker), so callers
/// streaming a body can keep reading until the answer is known.
pub fn manifest_marker(body: &[u8]) -> Option<bool> {
    let start = body
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x00))?;
    let trimmed = &body[start..];
    let marker = MANIFEST_MARKER.as_bytes();

    if trimmed.len() >= marker.len() {
        Some(trimmed.starts_with(marker))
    } else if marker.starts_with(trimmed) {
        None
    } else {
        Some(false)
    }
}

fn path_has_suffix(url: &str, suffixes: &[&str]) -> bool {
    let path = url_path(url).to_ascii_lowercase();
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}

/// Path component of a URL; falls back to stripping query and fragment when
/// the URL does not parse.
fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
