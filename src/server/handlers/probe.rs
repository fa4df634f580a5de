//! `POST /probe` handler.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::debug;

use super::super::types::ServerState;
use crate::config::STATUS_MALFORMED_INPUT;
use crate::error_handling::ProbeInputError;
use crate::fetch::probe;
use crate::models::{ProbeRequest, ProbeResult};

/// Runs one probe described by the JSON request body.
///
/// An unparseable body or a missing URL is answered with 400 and an
/// error-shaped `ProbeResult`; every other outcome, including transport
/// failures, is a 200 carrying the probe's own status code.
pub async fn probe_handler(State(state): State<ServerState>, body: Bytes) -> Response {
    let request: ProbeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting probe request body: {}", e);
            return rejected(format!("Invalid request body: {}", e));
        }
    };
    if request.url.trim().is_empty() {
        return rejected(ProbeInputError::EmptyUrl.to_string());
    }

    let result = probe(request, &state.cache).await;
    (StatusCode::OK, Json(result)).into_response()
}

fn rejected(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ProbeResult::rejected(message, STATUS_MALFORMED_INPUT)),
    )
        .into_response()
}
