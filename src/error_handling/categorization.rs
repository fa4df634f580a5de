//! Transport failure categorization.
//!
//! Maps `reqwest::Error` values onto the coarse [`FailureKind`] reported in
//! redirect steps and probe results.

use std::error::Error as StdError;

use super::types::{FailureKind, ResolveError};

/// Categorizes a `reqwest::Error` into a `FailureKind`.
///
/// Timeouts are checked first because a timed-out connect is reported by
/// reqwest as both a timeout and a connect error. Resolver failures are found
/// by walking the source chain for a [`ResolveError`].
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if caused_by_resolver(error) {
        FailureKind::Dns
    } else if error.is_builder() {
        FailureKind::Builder
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_body() || error.is_decode() {
        FailureKind::Body
    } else if error.is_request() {
        FailureKind::Request
    } else {
        FailureKind::Other
    }
}

fn caused_by_resolver(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(err) = source {
        if err.downcast_ref::<ResolveError>().is_some() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Formats an error and its full source chain on one line.
///
/// reqwest's top-level message ("error sending request for url ...") rarely
/// names the cause, so the chain is appended for the probe body.
pub fn describe_error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        let text = err.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = err.source();
    }
    message
}
