// Shared test helpers for spinning up mock origin servers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;

use stream_probe::ProbeRequest;

/// Serves `app` on an ephemeral localhost port and returns its base URL
/// (`http://127.0.0.1:PORT`).
#[allow(dead_code)] // Used by other test files
pub async fn start_mock_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server failed to start");
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{}", addr)
}

/// A probe request with a short timeout suitable for local servers.
#[allow(dead_code)] // Used by other test files
pub fn local_request(url: impl Into<String>) -> ProbeRequest {
    let mut request = ProbeRequest::new(url);
    request.timeout = 5;
    request
}
