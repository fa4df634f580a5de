//! SOCKS5 proxy configuration.

use crate::error_handling::ProbeInputError;

/// Proxy authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    /// Username for proxy authentication
    pub username: String,
    /// Password for proxy authentication
    pub password: String,
}

/// A parsed SOCKS5 proxy address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy host (name or IP literal, without brackets)
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Credentials, present only when both parts were non-empty
    pub auth: Option<ProxyAuth>,
}

impl ProxyConfig {
    /// Parses `host:port`, optionally prefixed with `socks5://` or `socks5h://`.
    ///
    /// # Errors
    ///
    /// Returns `ProbeInputError::InvalidProxy` if the host or port is missing
    /// or the port is not a number.
    pub fn parse(address: &str, credentials: Option<(&str, &str)>) -> Result<Self, ProbeInputError> {
        let invalid = || ProbeInputError::InvalidProxy(address.to_string());

        let trimmed = address.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let authority = ["socks5://", "socks5h://"]
            .iter()
            .find(|prefix| lowered.starts_with(*prefix))
            .map_or(trimmed, |prefix| &trimmed[prefix.len()..])
            .trim_end_matches('/');

        let (host, port) = authority.rsplit_once(':').ok_or_else(invalid)?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self {
            host: host.to_string(),
            port,
            auth: credentials.map(|(username, password)| ProxyAuth {
                username: username.to_string(),
                password: password.to_string(),
            }),
        })
    }
}
