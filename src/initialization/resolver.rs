//! Hosts-override-aware DNS resolver for reqwest.
//!
//! Implements `reqwest::dns::Resolve` so a hosts override is applied at
//! connect time: the URL, the `Host` header and TLS SNI all keep the original
//! hostname while the socket goes to the override IP. Every other name is
//! resolved through the system resolver (`tokio::net::lookup_host`).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::debug;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::error_handling::ResolveError;
use crate::fetch::HostsMap;

/// DNS resolver that consults a hosts-override map before the system resolver.
#[derive(Debug, Clone, Default)]
pub struct HostsResolver {
    overrides: Arc<HostsMap>,
}

impl HostsResolver {
    /// Creates a resolver backed by the given override map.
    pub fn new(overrides: HostsMap) -> Self {
        Self {
            overrides: Arc::new(overrides),
        }
    }

    /// Override IP for `host`, if one is configured.
    pub fn override_for(&self, host: &str) -> Option<IpAddr> {
        self.overrides.get(&host.to_ascii_lowercase()).copied()
    }

    pub(crate) fn overrides(&self) -> &HostsMap {
        &self.overrides
    }

    /// Resolves `host` to every address it maps to (override first).
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the system lookup fails or yields nothing.
    pub async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if let Some(ip) = self.override_for(host) {
            debug!("Hosts override: {} -> {}", host, ip);
            return Ok(vec![ip]);
        }
        let literal = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ResolveError {
                host: host.to_string(),
                reason: e.to_string(),
            })?
            .map(|addr| addr.ip())
            .collect();

        if addrs.is_empty() {
            return Err(ResolveError {
                host: host.to_string(),
                reason: "no addresses returned".to_string(),
            });
        }
        Ok(addrs)
    }

    /// Resolves `host` to a single IPv4 address.
    ///
    /// An override IP is returned as configured, even when it is IPv6.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if no IPv4 address is available.
    pub async fn lookup_ipv4(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Some(ip) = self.override_for(host) {
            return Ok(ip);
        }
        self.lookup(host)
            .await?
            .into_iter()
            .find(IpAddr::is_ipv4)
            .ok_or_else(|| ResolveError {
                host: host.to_string(),
                reason: "no IPv4 address returned".to_string(),
            })
    }
}

impl Resolve for HostsResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let ips = resolver
                .lookup(name.as_str())
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

            // hyper replaces port 0 with the URL's port
            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}

/// Resolves a proxy host to an IPv4 address (literal IPs pass through).
pub(crate) async fn resolve_proxy_host(
    resolver: &HostsResolver,
    host: &str,
) -> Result<Ipv4Addr, ResolveError> {
    match resolver.lookup_ipv4(host).await? {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => Err(ResolveError {
            host: host.to_string(),
            reason: format!("proxy resolves to IPv6 address {}", ip),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(pairs: &[(&str, &str)]) -> HostsResolver {
        HostsResolver::new(
            pairs
                .iter()
                .map(|(host, ip)| (host.to_string(), ip.parse().unwrap()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_override_takes_precedence() {
        let resolver = resolver_with(&[("example.com", "127.0.0.1")]);
        let ips = resolver.lookup("example.com").await.unwrap();
        assert_eq!(ips, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(resolver.overrides().len(), 1);
    }

    #[tokio::test]
    async fn test_override_lookup_is_case_insensitive() {
        let resolver = resolver_with(&[("cdn.example.com", "10.1.2.3")]);
        assert_eq!(
            resolver.override_for("CDN.Example.COM"),
            Some("10.1.2.3".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn test_ip_literal_passes_through() {
        let resolver = HostsResolver::default();
        assert_eq!(
            resolver.lookup("192.0.2.7").await.unwrap(),
            vec!["192.0.2.7".parse::<IpAddr>().unwrap()]
        );
        assert_eq!(
            resolver.lookup("[::1]").await.unwrap(),
            vec!["::1".parse::<IpAddr>().unwrap()]
        );
    }

    #[tokio::test]
    async fn test_localhost_resolves_via_system() {
        let resolver = HostsResolver::default();
        let ips = resolver.lookup("localhost").await.unwrap();
        assert!(ips.iter().any(|ip| ip.is_loopback()));
    }

    #[tokio::test]
    async fn test_invalid_tld_fails_with_resolve_error() {
        let resolver = HostsResolver::default();
        let err = resolver.lookup("no-such-host.invalid").await.unwrap_err();
        assert_eq!(err.host, "no-such-host.invalid");
    }

    #[tokio::test]
    async fn test_proxy_host_must_be_ipv4() {
        let resolver = resolver_with(&[("proxy.test", "::1")]);
        assert!(resolve_proxy_host(&resolver, "proxy.test").await.is_err());
        assert_eq!(
            resolve_proxy_host(&resolver, "127.0.0.1").await.unwrap(),
            Ipv4Addr::LOCALHOST
        );
    }
}
