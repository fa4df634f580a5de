//! Per-probe request executor.
//!
//! Walks one probe hop by hop: prepare the hop URL, dispatch it, record a
//! [`RedirectStep`], then either follow the `Location` header or capture and
//! package the final body. Every path ends in a [`ProbeResult`]; nothing is
//! retried.

use std::time::Instant;

use log::{debug, warn};
use reqwest::header::{CONTENT_ENCODING, LOCATION};
use reqwest::Method;
use url::Url;

use super::body::{capture_body, CaptureHints};
use super::hosts::{apply_override, parse_hosts_map, rewrite_to_ip};
use super::package::package_body;
use super::proxy::ProxyConfig;
use super::redirects::resolve_location;
use super::request::{capture_headers, RequestHeaders};
use crate::cache::ResponseCache;
use crate::classify::{
    content_type, declared_length, is_manifest_content_type, is_manifest_url,
    is_media_content_type, is_media_url,
};
use crate::config::{STATUS_MALFORMED_INPUT, STATUS_TRANSPORT_FAILURE};
use crate::error_handling::{
    categorize_reqwest_error, describe_error_chain, FailureKind, InitializationError,
    ProbeInputError,
};
use crate::initialization::{init_probe_client, HostsResolver};
use crate::models::{HeaderMap, ProbeRequest, ProbeResult, RedirectStep};
use crate::utils::sanitize::sanitize_and_truncate_error_message;

/// Runs a probe to completion.
///
/// Convenience wrapper around [`ProbeExecutor`].
///
/// # Examples
///
/// ```no_run
/// use stream_probe::{probe, ProbeRequest, ResponseCache};
///
/// # async fn run() {
/// let cache = ResponseCache::default();
/// let result = probe(ProbeRequest::new("http://example.com/live.m3u8"), &cache).await;
/// println!("{} after {} redirects", result.status_code, result.redirect_count);
/// # }
/// ```
pub async fn probe(request: ProbeRequest, cache: &ResponseCache) -> ProbeResult {
    ProbeExecutor::new(request, cache).run().await
}

/// Where the next hop goes after preparation.
enum Next {
    /// Follow a redirect to this URL
    Continue(String),
    /// The result is complete
    Terminate,
}

/// Everything fixed for the lifetime of one probe.
struct ProbeContext {
    client: reqwest::Client,
    method: Method,
    headers: RequestHeaders,
    resolver: HostsResolver,
    proxied: bool,
    follow_redirects: bool,
    max_redirects: usize,
}

/// Stateful controller for one probe.
///
/// Owns the result being built; `run` consumes the executor and returns it.
pub struct ProbeExecutor<'a> {
    request: ProbeRequest,
    cache: &'a ResponseCache,
    result: ProbeResult,
}

impl<'a> ProbeExecutor<'a> {
    /// Creates an executor for `request`, storing long bodies in `cache`.
    pub fn new(request: ProbeRequest, cache: &'a ResponseCache) -> Self {
        let result = ProbeResult::new(request.url.trim());
        Self {
            request,
            cache,
            result,
        }
    }

    /// Executes the probe and returns its terminal record.
    pub async fn run(mut self) -> ProbeResult {
        let started = Instant::now();
        let start_url = self.result.url.clone();

        match self.prepare().await {
            Ok(context) => {
                let mut current = start_url;
                loop {
                    match self.hop(&context, current).await {
                        Next::Continue(next) => current = next,
                        Next::Terminate => break,
                    }
                }
            }
            Err(Rejection::Input(e)) => self.reject(start_url, e),
            Err(Rejection::Client(e)) => {
                let kind = match &e {
                    InitializationError::ProxyResolveError(_) => FailureKind::Dns,
                    InitializationError::HttpClientError(err) => categorize_reqwest_error(err),
                    InitializationError::LoggerError(_) => FailureKind::Other,
                };
                let message = describe_error_chain(&e);
                self.fail(start_url, Instant::now(), kind, message, HeaderMap::new());
            }
        }

        self.result.time = started.elapsed().as_secs_f64();
        self.result
    }

    /// Validates the probe input and builds the per-probe client.
    async fn prepare(&self) -> Result<ProbeContext, Rejection> {
        let method_name = self.request.normalized_method();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| ProbeInputError::InvalidMethod(method_name.clone()))?;

        prepare_hop_url(&self.result.url)?;

        let proxy = self
            .request
            .proxy_address()
            .map(|address| ProxyConfig::parse(address, self.request.proxy_credentials()))
            .transpose()?;

        let resolver = HostsResolver::new(parse_hosts_map(&self.request.host));
        let timeout = std::time::Duration::from_secs(self.request.timeout_secs());
        let client = init_probe_client(timeout, &resolver, proxy.as_ref()).await?;

        Ok(ProbeContext {
            client,
            method,
            headers: RequestHeaders::from_caller(&self.request.headers),
            resolver,
            proxied: proxy.is_some(),
            follow_redirects: self.request.follow_redirects,
            max_redirects: self.request.max_redirects(),
        })
    }

    /// Runs one hop: prepare, dispatch, classify.
    async fn hop(&mut self, context: &ProbeContext, current: String) -> Next {
        let url = match prepare_hop_url(&current) {
            Ok(url) => url,
            Err(e) => {
                self.reject(current, e);
                return Next::Terminate;
            }
        };

        let hop_started = Instant::now();
        let method = if is_media_url(url.as_str()) {
            Method::HEAD
        } else {
            context.method.clone()
        };

        let (dispatch_url, host_header) = if context.proxied {
            // Target names must never reach the proxy
            let target = match apply_override(&url, context.resolver.overrides()) {
                Some(target) => Ok(Some(target)),
                None => context
                    .resolver
                    .lookup_ipv4(url.host_str().unwrap_or_default())
                    .await
                    .map(|ip| rewrite_to_ip(&url, ip)),
            };
            match target {
                Ok(Some(target)) => (target.dispatch_url, Some(target.host_header)),
                Ok(None) => (url.clone(), None),
                Err(e) => {
                    let message = describe_error_chain(&e);
                    self.fail(current, hop_started, FailureKind::Dns, message, HeaderMap::new());
                    return Next::Terminate;
                }
            }
        } else {
            (url.clone(), None)
        };

        debug!("{} {} (dispatching to {})", method, current, dispatch_url);
        let sent = context
            .client
            .request(method, dispatch_url)
            .headers(context.headers.for_hop(host_header.as_deref()))
            .send()
            .await;

        let mut response = match sent {
            Ok(response) => response,
            Err(e) => {
                let message = describe_error_chain(&e);
                self.fail(current, hop_started, categorize_reqwest_error(&e), message, HeaderMap::new());
                return Next::Terminate;
            }
        };

        let status = response.status().as_u16();
        let headers = capture_headers(response.headers());
        let location = response
            .headers()
            .get(LOCATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        if let Some(location) = location.filter(|_| self.should_follow(context, status)) {
            let next = resolve_location(&url, &location);
            debug!("{} redirected ({}) to {}", current, status, next);
            self.record_step(current, status, headers, hop_started, None);
            self.result.redirect_count += 1;
            return Next::Continue(next);
        }

        let content_type = content_type(&headers);
        let hints = CaptureHints {
            manifest: is_manifest_url(url.as_str()) || is_manifest_content_type(&content_type),
            media: is_media_url(&self.result.url)
                || is_media_url(url.as_str())
                || is_media_content_type(&content_type),
            declared_length: declared_length(&headers),
        };
        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match capture_body(&mut response, content_encoding.as_deref(), hints).await {
            Ok(captured) => {
                if captured.partial {
                    debug!("Captured {} bytes of {} before stopping", captured.bytes.len(), current);
                }
                self.record_step(current.clone(), status, headers.clone(), hop_started, None);
                self.result.final_url = current;
                self.result.status_code = status;
                self.result.headers = headers;
                package_body(&mut self.result, captured.bytes, self.cache);
            }
            Err(e) => {
                let message = describe_error_chain(&e);
                self.fail(current, hop_started, FailureKind::Body, message, headers);
            }
        }
        Next::Terminate
    }

    fn should_follow(&self, context: &ProbeContext, status: u16) -> bool {
        context.follow_redirects
            && (300..400).contains(&status)
            && self.result.redirect_count < context.max_redirects
    }

    fn record_step(
        &mut self,
        url: String,
        status_code: u16,
        response_headers: HeaderMap,
        started: Instant,
        failure: Option<FailureKind>,
    ) {
        self.result.redirects.push(RedirectStep {
            url,
            status_code,
            response_headers,
            time: started.elapsed().as_secs_f64(),
            failure,
        });
    }

    /// Terminates with a synthetic 400 for input that cannot be dispatched.
    fn reject(&mut self, url: String, error: ProbeInputError) {
        debug!("Rejecting probe of '{}': {}", url, error);
        let message = error.to_string();
        self.record_step(url.clone(), STATUS_MALFORMED_INPUT, HeaderMap::new(), Instant::now(), None);
        self.result.final_url = url;
        self.result.status_code = STATUS_MALFORMED_INPUT;
        self.result.body = message.clone();
        self.result.error = Some(message);
    }

    /// Terminates with a 504 transport failure, keeping any captured headers.
    fn fail(
        &mut self,
        url: String,
        started: Instant,
        kind: FailureKind,
        message: String,
        headers: HeaderMap,
    ) {
        let message = sanitize_and_truncate_error_message(&format!("{}: {}", kind, message));
        warn!("Probe of {} failed: {}", url, message);
        self.record_step(
            url.clone(),
            STATUS_TRANSPORT_FAILURE,
            headers.clone(),
            started,
            Some(kind),
        );
        self.result.final_url = url;
        self.result.status_code = STATUS_TRANSPORT_FAILURE;
        self.result.headers = headers;
        self.result.body = message.clone();
        self.result.failure = Some(kind);
        self.result.error = Some(message);
    }
}

/// Why a probe never reached its first dispatch.
enum Rejection {
    Input(ProbeInputError),
    Client(InitializationError),
}

impl From<ProbeInputError> for Rejection {
    fn from(e: ProbeInputError) -> Self {
        Rejection::Input(e)
    }
}

impl From<InitializationError> for Rejection {
    fn from(e: InitializationError) -> Self {
        Rejection::Client(e)
    }
}

/// Parses a hop URL and checks it can be dispatched.
///
/// # Errors
///
/// Returns `ProbeInputError` for empty, unparseable, host-less or
/// non-HTTP(S) URLs.
pub fn prepare_hop_url(raw: &str) -> Result<Url, ProbeInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProbeInputError::EmptyUrl);
    }

    let url = Url::parse(raw).map_err(|e| ProbeInputError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProbeInputError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
            url: raw.to_string(),
        });
    }
    if matches!(url.host_str(), None | Some("")) {
        return Err(ProbeInputError::InvalidUrl(format!("{}: missing host", raw)));
    }
    Ok(url)
}
