//! Probe input and output records.
//!
//! [`ProbeRequest`] is the immutable configuration of one probe; [`ProbeResult`]
//! is the terminal record it produces, with one [`RedirectStep`] per attempted hop.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{
    DEFAULT_MAX_REDIRECTS, DEFAULT_METHOD, DEFAULT_TIMEOUT_SECS, MAX_REDIRECTS_LIMIT,
    MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
use crate::error_handling::FailureKind;

/// Response headers with lower-cased names, ordered for stable output.
pub type HeaderMap = BTreeMap<String, String>;

/// Configuration of a single probe.
///
/// Deserializes from the JSON shape sent by probe front-ends. Deserialization
/// is lenient: numeric fields accept numbers or numeric strings, unknown
/// fields are ignored and missing fields fall back to defaults. Bounds are
/// applied by the accessor methods rather than at parse time.
///
/// # Examples
///
/// ```
/// use stream_probe::ProbeRequest;
///
/// let request: ProbeRequest = serde_json::from_str(
///     r#"{"url": "http://example.com/live.m3u8", "timeout": "500", "max_redirects": 3}"#,
/// ).unwrap();
/// assert_eq!(request.timeout_secs(), 120);
/// assert_eq!(request.max_redirects(), 3);
/// assert!(request.follow_redirects);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeRequest {
    /// Target URL
    #[serde(default)]
    pub url: String,

    /// HTTP method (upper-cased before use)
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers; names are matched case-insensitively
    #[serde(default, deserialize_with = "lenient_headers")]
    pub headers: HashMap<String, String>,

    /// Per-hop timeout in seconds
    #[serde(default = "default_timeout", deserialize_with = "lenient_timeout")]
    pub timeout: u64,

    /// SOCKS5 proxy address (`host:port`, optionally prefixed with `socks5://`)
    #[serde(default, deserialize_with = "lenient_string")]
    pub proxy: String,

    /// Proxy username; used only together with a password
    #[serde(default, deserialize_with = "lenient_string")]
    pub proxy_username: String,

    /// Proxy password; used only together with a username
    #[serde(default, deserialize_with = "lenient_string")]
    pub proxy_password: String,

    /// Whether 3xx responses are followed
    #[serde(default = "default_follow", deserialize_with = "lenient_follow")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow
    #[serde(default = "default_max_redirects", deserialize_with = "lenient_max_redirects")]
    pub max_redirects: u64,

    /// Raw hosts-override text (`ip hostname` or `hostname ip` per line)
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: String,
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_follow() -> bool {
    true
}

fn default_max_redirects() -> u64 {
    DEFAULT_MAX_REDIRECTS as u64
}

impl ProbeRequest {
    /// Creates a request for `url` with every other field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            proxy: String::new(),
            proxy_username: String::new(),
            proxy_password: String::new(),
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS as u64,
            host: String::new(),
        }
    }

    /// Timeout clamped to the supported range.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS)
    }

    /// Redirect limit clamped to the supported range.
    pub fn max_redirects(&self) -> usize {
        self.max_redirects.min(MAX_REDIRECTS_LIMIT as u64) as usize
    }

    /// Upper-cased, trimmed method (`GET` when blank).
    pub fn normalized_method(&self) -> String {
        let method = self.method.trim();
        if method.is_empty() {
            default_method()
        } else {
            method.to_ascii_uppercase()
        }
    }

    /// Trimmed proxy address, if one was given.
    pub fn proxy_address(&self) -> Option<&str> {
        let proxy = self.proxy.trim();
        (!proxy.is_empty()).then_some(proxy)
    }

    /// Proxy credentials, only when both username and password are non-empty.
    pub fn proxy_credentials(&self) -> Option<(&str, &str)> {
        let username = self.proxy_username.trim();
        let password = self.proxy_password.trim();
        (!username.is_empty() && !password.is_empty()).then_some((username, password))
    }
}

fn lenient_timeout<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.unwrap_or_else(default_timeout))
}

fn lenient_max_redirects<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.unwrap_or_else(default_max_redirects))
}

/// Number or numeric string; `None` for `null` and blank strings, which
/// front-ends send for `parseInt` of an empty input.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid number: {}", n))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(|v| Some(v.max(0) as u64))
                .map_err(|_| D::Error::custom(format!("invalid number: {}", s)))
        }
        Value::Bool(b) => Ok(Some(u64::from(b))),
        Value::Null => Ok(None),
        other => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn lenient_follow<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Null => default_follow(),
        _ => true,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_headers<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut headers = HashMap::new();
    // Some front-ends send an empty list instead of an empty object
    if let Value::Object(map) = Value::deserialize(deserializer)? {
        for (name, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Null => continue,
                other => other.to_string(),
            };
            headers.insert(name, value);
        }
    }
    Ok(headers)
}

/// One attempted hop of a probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectStep {
    /// URL requested for this hop (never the hosts-override IP)
    pub url: String,
    /// Status code (504 for transport failures, 400 for unusable input)
    pub status_code: u16,
    /// Response headers with lower-cased names
    pub response_headers: HeaderMap,
    /// Elapsed time for the hop in seconds
    pub time: f64,
    /// Failure kind when the hop did not complete
    pub failure: Option<FailureKind>,
}

/// Coarse file type reported alongside the classification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Ordinary content (serialized as an empty string)
    #[default]
    #[serde(rename = "")]
    Generic,
    /// Playlist manifest
    Manifest,
    /// Video or audio payload
    Media,
    /// Body above the large-file threshold
    LargeFile,
}

/// Terminal record of a probe.
///
/// Every field is always serialized so consumers never need null checks
/// beyond the explicitly optional ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    /// URL as originally requested
    pub url: String,
    /// URL of the last attempted hop
    pub final_url: String,
    /// Status code of the last attempted hop
    pub status_code: u16,
    /// Headers of the last attempted hop
    pub headers: HeaderMap,
    /// Inline body view (possibly truncated or replaced with a summary)
    pub body: String,
    /// Body size in bytes (see `stream_probe` docs for summaries)
    pub size: u64,
    /// Total elapsed time in seconds
    pub time: f64,
    /// Number of redirects followed
    pub redirect_count: usize,
    /// Every attempted hop, in order
    pub redirects: Vec<RedirectStep>,
    /// Body is a playlist manifest
    pub is_manifest: bool,
    /// Body is a media payload
    pub is_media: bool,
    /// Body exceeds the large-file threshold
    pub is_large: bool,
    /// Inline body was cut to the inline limit
    pub truncated: bool,
    /// Inline body was replaced by a summary
    pub skip_body: bool,
    /// Coarse file type
    pub file_type: FileType,
    /// A download handle is attached
    pub download_available: bool,
    /// Response cache id of the full body
    pub download_id: Option<String>,
    /// Path serving the full body
    pub download_url: Option<String>,
    /// Failure kind for transport failures
    pub failure: Option<FailureKind>,
    /// Error description for malformed input or transport failures
    pub error: Option<String>,
}

impl ProbeResult {
    /// Creates an empty result for `url` with every field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status_code: 0,
            headers: HeaderMap::new(),
            body: String::new(),
            size: 0,
            time: 0.0,
            redirect_count: 0,
            redirects: Vec::new(),
            is_manifest: false,
            is_media: false,
            is_large: false,
            truncated: false,
            skip_body: false,
            file_type: FileType::Generic,
            download_available: false,
            download_id: None,
            download_url: None,
            failure: None,
            error: None,
        }
    }

    /// Error-shaped result used when a request never reaches the engine
    /// (for example, an unparseable request body).
    ///
    /// Carries one synthetic step so `redirects` still holds
    /// `redirect_count + 1` entries.
    pub fn rejected(message: impl Into<String>, status_code: u16) -> Self {
        let message = message.into();
        Self {
            status_code,
            body: message.clone(),
            redirects: vec![RedirectStep {
                url: String::new(),
                status_code,
                response_headers: HeaderMap::new(),
                time: 0.0,
                failure: None,
            }],
            error: Some(message),
            ..Self::new("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_request_defaults() {
        let request: ProbeRequest = serde_json::from_str(r#"{"url": "http://a.test/"}"#).unwrap();
        assert_eq!(request.normalized_method(), "GET");
        assert_eq!(request.timeout_secs(), 30);
        assert_eq!(request.max_redirects(), 10);
        assert!(request.follow_redirects);
        assert!(request.headers.is_empty());
        assert!(request.proxy_address().is_none());
        assert!(request.host.is_empty());
    }

    #[test]
    fn test_probe_request_clamps_bounds() {
        let request: ProbeRequest = serde_json::from_str(
            r#"{"url": "http://a.test/", "timeout": 0, "max_redirects": 500}"#,
        )
        .unwrap();
        assert_eq!(request.timeout_secs(), 1);
        assert_eq!(request.max_redirects(), 50);

        let request: ProbeRequest =
            serde_json::from_str(r#"{"url": "http://a.test/", "timeout": 999}"#).unwrap();
        assert_eq!(request.timeout_secs(), 120);
    }

    #[test]
    fn test_probe_request_lenient_types() {
        let request: ProbeRequest = serde_json::from_str(
            r#"{
                "url": "http://a.test/",
                "method": "post",
                "timeout": "15",
                "max_redirects": null,
                "follow_redirects": "false",
                "headers": [],
                "otherHeaders": "X-Ignored: 1"
            }"#,
        )
        .unwrap();
        assert_eq!(request.normalized_method(), "POST");
        assert_eq!(request.timeout_secs(), 15);
        assert_eq!(request.max_redirects(), 10);
        assert!(!request.follow_redirects);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_probe_request_null_fields_take_defaults() {
        let request: ProbeRequest = serde_json::from_str(
            r#"{
                "url": "http://a.test/",
                "timeout": null,
                "max_redirects": null,
                "follow_redirects": null
            }"#,
        )
        .unwrap();
        assert_eq!(request.timeout_secs(), 30);
        assert_eq!(request.max_redirects(), 10);
        assert!(request.follow_redirects);

        let request: ProbeRequest = serde_json::from_str(
            r#"{"url": "http://a.test/", "timeout": "", "max_redirects": " "}"#,
        )
        .unwrap();
        assert_eq!(request.timeout_secs(), 30);
        assert_eq!(request.max_redirects(), 10);
    }

    #[test]
    fn test_probe_request_proxy_credentials_need_both_parts() {
        let mut request = ProbeRequest::new("http://a.test/");
        request.proxy = " 10.0.0.1:1080 ".to_string();
        request.proxy_username = "user".to_string();
        assert_eq!(request.proxy_address(), Some("10.0.0.1:1080"));
        assert!(request.proxy_credentials().is_none());

        request.proxy_password = "secret".to_string();
        assert_eq!(request.proxy_credentials(), Some(("user", "secret")));
    }

    #[test]
    fn test_probe_result_serializes_every_field() {
        let result = ProbeResult::new("http://a.test/");
        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "url",
            "final_url",
            "status_code",
            "headers",
            "body",
            "size",
            "time",
            "redirect_count",
            "redirects",
            "is_manifest",
            "is_media",
            "is_large",
            "truncated",
            "skip_body",
            "file_type",
            "download_available",
            "download_id",
            "download_url",
            "failure",
            "error",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["file_type"], "");
        assert_eq!(json["headers"], serde_json::json!({}));
        assert_eq!(json["redirects"], serde_json::json!([]));
    }

    #[test]
    fn test_file_type_serialization() {
        assert_eq!(serde_json::to_string(&FileType::Media).unwrap(), "\"media\"");
        assert_eq!(
            serde_json::to_string(&FileType::LargeFile).unwrap(),
            "\"large_file\""
        );
        assert_eq!(
            serde_json::to_string(&FileType::Manifest).unwrap(),
            "\"manifest\""
        );
    }

    #[test]
    fn test_rejected_result() {
        let result = ProbeResult::rejected("URL must not be empty", 400);
        assert_eq!(result.status_code, 400);
        assert_eq!(result.error.as_deref(), Some("URL must not be empty"));
        assert_eq!(result.body, "URL must not be empty");
        assert_eq!(result.redirect_count, 0);
        assert_eq!(result.redirects.len(), 1);
        assert_eq!(result.redirects[0].status_code, 400);
    }
}
