//! Probe service data structures.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::ResponseCache;

/// Shared state for the probe service
#[derive(Clone)]
pub struct ServerState {
    /// Cache holding full bodies for `/download/{id}`
    pub cache: Arc<ResponseCache>,
}

/// JSON body for error responses that are not probe results
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error
    pub error: String,
}
