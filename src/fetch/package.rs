//! Final-hop packaging.
//!
//! Turns the captured body of the final hop into the inline view returned to
//! callers: a summary for media and large files, the full text for
//! manifests, and a bounded prefix plus a download handle for everything
//! else.

use log::{debug, warn};

use crate::cache::ResponseCache;
use crate::classify::{classify, content_type, declared_length, Classification, ContentProbe};
use crate::config::{DOWNLOAD_PATH_PREFIX, INLINE_BODY_LIMIT};
use crate::models::ProbeResult;
use crate::utils::{format_bytes, truncate_chars};

/// Applies classification and body policy to a probe result.
///
/// `result` must already carry the URLs and final headers; `body` is the
/// captured final-hop body.
pub(crate) fn package_body(result: &mut ProbeResult, body: Vec<u8>, cache: &ResponseCache) {
    let classification = classify(&ContentProbe {
        original_url: &result.url,
        final_url: &result.final_url,
        headers: &result.headers,
        body: &body,
    });

    result.is_manifest = classification.is_manifest;
    result.is_media = classification.is_media;
    result.is_large = classification.is_large;
    result.file_type = classification.file_type();
    result.size = body.len() as u64;

    if classification.skips_body() {
        if let Some(declared) = declared_length(&result.headers).filter(|len| *len > 0) {
            result.size = declared;
        }
        result.body = summarize(result, &classification);
        result.skip_body = true;
        return;
    }

    let text = String::from_utf8_lossy(&body).into_owned();
    let over_limit = truncate_chars(&text, INLINE_BODY_LIMIT).is_some();

    // Manifests stay inline in full; the handle is only a convenience
    if classification.is_manifest {
        if over_limit {
            attach_download(result, body, cache);
        }
        result.body = text;
        return;
    }

    let Some(prefix) = truncate_chars(&text, INLINE_BODY_LIMIT) else {
        result.body = text;
        return;
    };
    let note = if attach_download(result, body, cache) {
        "download the full body to see the rest"
    } else {
        "no download link could be created"
    };
    result.body = format!(
        "{}\n\n... (response body exceeded {} characters; showing the first {}, {}) ...",
        prefix, INLINE_BODY_LIMIT, INLINE_BODY_LIMIT, note
    );
    result.truncated = true;
}

/// Stores the full body and records the download handle on success.
fn attach_download(result: &mut ProbeResult, body: Vec<u8>, cache: &ResponseCache) -> bool {
    match cache.put(body, result.headers.clone()) {
        Ok(id) => {
            debug!("Full body of {} available as {}", result.final_url, id);
            result.download_available = true;
            result.download_url = Some(format!("{}{}", DOWNLOAD_PATH_PREFIX, id));
            result.download_id = Some(id);
            true
        }
        Err(e) => {
            warn!("Could not cache body of {}: {}", result.final_url, e);
            false
        }
    }
}

/// Builds the summary shown instead of a media or large body.
fn summarize(result: &ProbeResult, classification: &Classification) -> String {
    let kind = if classification.is_media {
        "media file"
    } else {
        "large file"
    };
    let content_type = content_type(&result.headers);

    let mut summary = String::from("[File info]\n\n");
    summary.push_str(&format!("File type: {}\n", kind));
    summary.push_str(&format!(
        "Content type: {}\n",
        if content_type.is_empty() {
            "unspecified"
        } else {
            content_type.as_str()
        }
    ));
    match declared_length(&result.headers).filter(|len| *len > 0) {
        Some(len) => summary.push_str(&format!("File size: {}\n", format_bytes(len))),
        None => summary.push_str(&format!("Response size: {}\n", format_bytes(result.size))),
    }
    summary.push_str(&format!("Final URL: {}\n", result.final_url));
    summary.push_str(&format!(
        "\nNote: this is a {}; the full body is not fetched to save resources.",
        kind
    ));
    summary
}
