//! Hosts override parsing.
//!
//! Override text uses the hosts-file shape, one mapping per line, in either
//! column order:
//!
//! ```text
//! # comment
//! 203.0.113.10   live.example.com
//! cdn.example.com 2001:db8::1
//! ```

use std::collections::HashMap;
use std::net::IpAddr;

use log::debug;
use url::Url;

/// Lower-cased hostname to override IP.
pub type HostsMap = HashMap<String, IpAddr>;

/// Parses hosts-override text into a map.
///
/// Blank lines and `#` comments are ignored. Lines that do not have exactly
/// two tokens, or where neither token is an IP address, are skipped. Later
/// lines win over earlier ones.
pub fn parse_hosts_map(text: &str) -> HostsMap {
    let mut map = HostsMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [first, second] = tokens.as_slice() else {
            debug!("Skipping hosts line with {} tokens: {}", tokens.len(), line);
            continue;
        };

        // Two IPs: classic hosts order, name in the second column
        let pair = match (first.parse::<IpAddr>(), second.parse::<IpAddr>()) {
            (Ok(ip), _) => Some((second, ip)),
            (Err(_), Ok(ip)) => Some((first, ip)),
            (Err(_), Err(_)) => None,
        };

        match pair {
            Some((host, ip)) => {
                map.insert(host.to_ascii_lowercase(), ip);
            }
            None => debug!("Skipping hosts line without an IP: {}", line),
        }
    }

    map
}

/// A hop redirected to an override (or pre-resolved) IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOverride {
    /// URL actually dispatched, with the host replaced by the IP
    pub dispatch_url: Url,
    /// `Host` header value carrying the original authority
    pub host_header: String,
}

/// Rewrites `url` to use the override IP for its host, if one is mapped.
pub fn apply_override(url: &Url, map: &HostsMap) -> Option<HostOverride> {
    let host = url.host_str()?;
    let ip = map.get(&host.to_ascii_lowercase())?;
    rewrite_to_ip(url, *ip)
}

/// Rewrites `url` to dispatch to `ip`, keeping port, path and query.
///
/// Returns `None` for URLs that cannot carry a host (never the case for
/// `http`/`https`).
pub fn rewrite_to_ip(url: &Url, ip: IpAddr) -> Option<HostOverride> {
    let host = url.host_str()?;
    let host_header = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let mut dispatch_url = url.clone();
    dispatch_url.set_ip_host(ip).ok()?;

    Some(HostOverride {
        dispatch_url,
        host_header,
    })
}
