//! Hop request construction.
//!
//! Builds the header set sent on every hop and captures response headers in
//! the lower-cased form reported back to callers.

use std::collections::HashMap;

use log::warn;
use reqwest::header::{
    HeaderMap as ReqwestHeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONNECTION, HOST,
    USER_AGENT,
};

use crate::config::{DEFAULT_ACCEPT_ENCODING, DEFAULT_USER_AGENT};
use crate::models::HeaderMap;

/// Header names the caller may not set; the probe controls them per hop.
const RESERVED_HEADERS: &[&str] = &["host", "connection"];

/// Headers sent on every hop of a probe.
///
/// Caller headers are kept except `Host` and `Connection`. A browser
/// User-Agent and the decodable content codings are added when the caller
/// gave none, and every hop asks the server to close the connection.
#[derive(Debug, Clone)]
pub(crate) struct RequestHeaders {
    headers: ReqwestHeaderMap,
}

impl RequestHeaders {
    /// Builds the hop headers from caller-supplied name/value pairs.
    ///
    /// Names and values that are not valid HTTP tokens are skipped with a
    /// warning instead of failing the probe.
    pub(crate) fn from_caller(caller: &HashMap<String, String>) -> Self {
        let mut headers = ReqwestHeaderMap::new();

        for (name, value) in caller {
            let lowered = name.trim().to_ascii_lowercase();
            if lowered.is_empty() || RESERVED_HEADERS.contains(&lowered.as_str()) {
                continue;
            }
            match (
                HeaderName::from_bytes(lowered.as_bytes()),
                HeaderValue::from_str(value.trim()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid request header '{}'", name),
            }
        }

        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        if !headers.contains_key(ACCEPT_ENCODING) {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(DEFAULT_ACCEPT_ENCODING));
        }
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        Self { headers }
    }

    /// Headers for one hop, with an explicit `Host` when the hop is
    /// dispatched to an IP.
    pub(crate) fn for_hop(&self, host_header: Option<&str>) -> ReqwestHeaderMap {
        let mut headers = self.headers.clone();
        if let Some(value) = host_header.and_then(|host| HeaderValue::from_str(host).ok()) {
            headers.insert(HOST, value);
        }
        headers
    }
}

/// Captures response headers with lower-cased names.
///
/// Repeated headers are joined with `", "`; values that are not valid UTF-8
/// are decoded lossily.
pub(crate) fn capture_headers(headers: &ReqwestHeaderMap) -> HeaderMap {
    let mut captured = HeaderMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
        captured
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_user_agent_and_connection_close() {
        let headers = RequestHeaders::from_caller(&HashMap::new()).for_hop(None);
        assert_eq!(headers.get(USER_AGENT).unwrap(), DEFAULT_USER_AGENT);
        assert_eq!(headers.get(CONNECTION).unwrap(), "close");
        assert!(headers.get(HOST).is_none());
    }

    #[test]
    fn test_caller_headers_kept_reserved_dropped() {
        let headers = RequestHeaders::from_caller(&caller(&[
            ("User-Agent", "VLC/3.0"),
            ("Referer", "http://portal.test/"),
            ("Host", "spoofed.test"),
            ("Connection", "keep-alive"),
        ]))
        .for_hop(None);

        assert_eq!(headers.get(USER_AGENT).unwrap(), "VLC/3.0");
        assert_eq!(headers.get("referer").unwrap(), "http://portal.test/");
        assert!(headers.get(HOST).is_none());
        assert_eq!(headers.get(CONNECTION).unwrap(), "close");
    }

    #[test]
    fn test_accept_encoding_defaults_to_decodable_codings() {
        let headers = RequestHeaders::from_caller(&HashMap::new()).for_hop(None);
        assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "gzip, deflate, br");

        let headers =
            RequestHeaders::from_caller(&caller(&[("Accept-Encoding", "identity")])).for_hop(None);
        assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "identity");
    }

    #[test]
    fn test_invalid_headers_skipped() {
        let headers = RequestHeaders::from_caller(&caller(&[
            ("Bad Name", "x"),
            ("X-Bad-Value", "line\nbreak"),
            ("X-Good", "ok"),
        ]))
        .for_hop(None);
        assert_eq!(headers.get("x-good").unwrap(), "ok");
        assert!(headers.get("x-bad-value").is_none());
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_for_hop_sets_host() {
        let headers = RequestHeaders::from_caller(&HashMap::new()).for_hop(Some("example.com:8080"));
        assert_eq!(headers.get(HOST).unwrap(), "example.com:8080");
    }

    #[test]
    fn test_capture_headers_joins_duplicates() {
        let mut headers = ReqwestHeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        let captured = capture_headers(&headers);
        assert_eq!(captured.get("set-cookie").unwrap(), "a=1, b=2");
        assert_eq!(captured.get("content-type").unwrap(), "text/plain");
    }
}
