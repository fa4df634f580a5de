//! HTTP client initialization.
//!
//! One client is built per probe so the timeout, proxy and hosts overrides
//! of that probe never leak into another.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::{ClientBuilder, Proxy};
use url::Url;

use super::resolver::{resolve_proxy_host, HostsResolver};
use crate::config::TCP_CONNECT_TIMEOUT_SECS;
use crate::error_handling::{InitializationError, ResolveError};
use crate::fetch::ProxyConfig;

/// Initializes the HTTP client used for every hop of one probe.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirects disabled so the redirect chain can be walked manually
/// - The probe's total timeout and a fixed connect timeout
/// - Certificate verification disabled (the probe reports, it does not trust)
/// - Transparent decompression off, so `content-encoding` and
///   `content-length` reach the captured headers
/// - The hosts-override resolver, or a SOCKS5 proxy when one is given
/// - No ambient system proxy
///
/// When a proxy is configured its host is resolved to IPv4 up front; the
/// executor then dispatches every hop to an IPv4 literal, so target names
/// never reach the proxy.
///
/// # Errors
///
/// Returns `InitializationError::ProxyResolveError` if the proxy host cannot
/// be resolved and `InitializationError::HttpClientError` if client creation
/// fails.
pub async fn init_probe_client(
    timeout: Duration,
    resolver: &HostsResolver,
    proxy: Option<&ProxyConfig>,
) -> Result<reqwest::Client, InitializationError> {
    let mut builder = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .danger_accept_invalid_certs(true)
        // Bodies are decoded by the capture so headers stay as sent
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .dns_resolver(Arc::new(resolver.clone()));

    builder = match proxy {
        Some(proxy) => builder.proxy(build_socks_proxy(resolver, proxy).await?),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

async fn build_socks_proxy(
    resolver: &HostsResolver,
    config: &ProxyConfig,
) -> Result<Proxy, InitializationError> {
    let ip = resolve_proxy_host(resolver, &config.host).await?;
    let address = format!("socks5://{}:{}", ip, config.port);
    debug!("Routing probe through SOCKS5 proxy {} ({})", address, config.host);

    // SOCKS5 credentials travel in the proxy URL's userinfo (percent-encoded)
    let mut url = Url::parse(&address).map_err(|e| {
        InitializationError::ProxyResolveError(ResolveError {
            host: config.host.clone(),
            reason: e.to_string(),
        })
    })?;
    if let Some(auth) = &config.auth {
        // Infallible for a URL with a host
        let _ = url.set_username(&auth.username);
        let _ = url.set_password(Some(&auth.password));
    }
    Ok(Proxy::all(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_probe_client_without_proxy() {
        let client = init_probe_client(Duration::from_secs(5), &HostsResolver::default(), None).await;
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_init_probe_client_with_literal_proxy() {
        let proxy = ProxyConfig::parse("127.0.0.1:1080", Some(("user", "pass"))).unwrap();
        let client =
            init_probe_client(Duration::from_secs(5), &HostsResolver::default(), Some(&proxy))
                .await;
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_unresolvable_proxy_host() {
        let proxy = ProxyConfig::parse("no-such-proxy.invalid:1080", None).unwrap();
        let err = init_probe_client(Duration::from_secs(5), &HostsResolver::default(), Some(&proxy))
            .await
            .unwrap_err();
        assert!(matches!(err, InitializationError::ProxyResolveError(_)));
    }
}
