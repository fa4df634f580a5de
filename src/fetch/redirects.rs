//! Redirect target resolution.
//!
//! The redirect chain itself is walked by the executor; this module only
//! turns a `Location` header into the absolute URL of the next hop.

use url::Url;

/// Resolves a `Location` header value against the URL of the hop that
/// returned it.
///
/// | `location`            | result                                  |
/// |-----------------------|-----------------------------------------|
/// | `http(s)://...`       | unchanged                               |
/// | `//host/path`         | base scheme + `:` + location            |
/// | `/path`               | base scheme, host and port + location   |
/// | anything else         | base directory + location               |
///
/// Never fails; a result that does not parse is rejected when the next hop
/// is prepared.
///
/// # Examples
///
/// ```
/// use stream_probe::fetch::resolve_location;
/// use url::Url;
///
/// let base = Url::parse("http://h.test:8080/live/a/index.m3u8?x=1").unwrap();
/// assert_eq!(resolve_location(&base, "/b"), "http://h.test:8080/b");
/// assert_eq!(resolve_location(&base, "seg.ts"), "http://h.test:8080/live/a/seg.ts");
/// ```
pub fn resolve_location(base: &Url, location: &str) -> String {
    let location = location.trim();
    let lowered = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return location.to_string();
    }

    if location.starts_with("//") {
        return format!("{}:{}", base.scheme(), location);
    }

    let origin = match (base.host_str(), base.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", base.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", base.scheme(), host),
        (None, _) => format!("{}://", base.scheme()),
    };

    if location.starts_with('/') {
        return format!("{}{}", origin, location);
    }

    let path = base.path();
    let directory = path.rfind('/').map_or("/", |idx| &path[..=idx]);
    format!("{}{}{}", origin, directory, location)
}
