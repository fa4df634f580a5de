//! Error type definitions.
//!
//! This module defines the error enums used throughout the probe and the
//! coarse failure kinds reported for transport failures.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The proxy host could not be resolved to an IPv4 address.
    #[error("Proxy resolution error: {0}")]
    ProxyResolveError(#[from] ResolveError),
}

/// Errors for probe input that cannot be dispatched at all.
///
/// These terminate a probe with a synthetic 400 result; they are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeInputError {
    /// The URL is empty.
    #[error("URL must not be empty")]
    EmptyUrl,

    /// The URL could not be parsed or has no host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The URL scheme is neither http nor https.
    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
        /// The URL that carried it
        url: String,
    },

    /// The HTTP method is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The proxy address is not `host:port`.
    #[error("Invalid proxy address: {0}")]
    InvalidProxy(String),
}

/// Errors raised by the response cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache already holds its maximum number of entries.
    #[error("Response cache is full ({0} entries)")]
    Full(usize),

    /// Storing the body would exceed the total byte budget.
    #[error("Response cache byte budget exceeded ({requested} bytes requested, {available} available)")]
    OverBudget {
        /// Size of the rejected body
        requested: usize,
        /// Bytes still available in the budget
        available: usize,
    },
}

/// Errors raised while reading the final-hop body.
#[derive(Error, Debug)]
pub enum BodyError {
    /// The connection failed mid-body.
    #[error("Response body error: {0}")]
    Transport(#[from] ReqwestError),

    /// The body did not decode under its declared `content-encoding`.
    #[error("Failed to decode {encoding} response body: {source}")]
    Decode {
        /// The declared content coding
        encoding: &'static str,
        /// Decoder failure
        source: std::io::Error,
    },
}

/// Failure raised by the probe's DNS resolver.
///
/// Kept as a distinct type so transport failures caused by name resolution
/// can be told apart from refused connections further up the error chain.
#[derive(Error, Debug)]
#[error("DNS resolution failed for {host}: {reason}")]
pub struct ResolveError {
    /// Hostname that failed to resolve
    pub host: String,
    /// Human-readable cause
    pub reason: String,
}

/// Coarse classification of a failed hop.
///
/// Failed hops are still reported with status 504; this kind tells callers
/// what actually went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The hop exceeded the configured timeout
    Timeout,
    /// The hostname (or proxy hostname) could not be resolved
    Dns,
    /// The TCP/TLS/SOCKS connection could not be established
    Connect,
    /// The request failed while being sent
    Request,
    /// The response body could not be read or decoded
    Body,
    /// The request could not be built from the given input
    Builder,
    /// Anything else
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Human-readable description, used as the prefix of failure bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Request timed out",
            FailureKind::Dns => "DNS resolution failed",
            FailureKind::Connect => "Connection failed",
            FailureKind::Request => "Request failed",
            FailureKind::Body => "Response body error",
            FailureKind::Builder => "Request could not be built",
            FailureKind::Other => "Transport error",
        }
    }
}
