//! `GET /download/{id}` handler.

use axum::{
    extract::{Path, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, info};

use super::super::types::{ErrorResponse, ServerState};

/// Serves a cached body once as an attachment.
///
/// The entry is removed by this request; a second request for the same id,
/// like one for an unknown or expired id, gets 404.
pub async fn download_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Response {
    let Some(entry) = state.cache.take(&id) else {
        debug!("Download {} not found", id);
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Download not found or expired".to_string(),
            }),
        )
            .into_response();
    };

    let filename = entry.download_filename();
    info!("Serving download {} as {} ({} bytes)", id, filename, entry.body.len());

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, entry.download_content_type()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (CONTENT_LENGTH, entry.body.len().to_string()),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        entry.body,
    )
        .into_response()
}
