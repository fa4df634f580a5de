//! Classification and body packaging of real responses.

mod helpers;

use axum::{http::header::CONTENT_TYPE, routing::get, Router};

use helpers::{local_request, start_mock_server};
use stream_probe::{probe, FileType, ResponseCache};

fn playlist(len: usize) -> String {
    let mut body = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
    while body.len() < len {
        body.push_str("#EXTINF:10,\nsegment.ts\n");
    }
    body.truncate(len);
    body
}

#[tokio::test]
async fn test_long_manifest_inline_with_download() {
    let body = playlist(5000);
    let app = Router::new().route(
        "/live",
        get({
            let body = body.clone();
            move || async move { ([(CONTENT_TYPE, "text/plain")], body) }
        }),
    );
    let base = start_mock_server(app).await;

    let cache = ResponseCache::default();
    let result = probe(local_request(format!("{}/live", base)), &cache).await;

    assert!(result.is_manifest);
    assert!(!result.is_media);
    assert_eq!(result.file_type, FileType::Manifest);
    assert!(!result.truncated);
    assert!(!result.skip_body);
    assert_eq!(result.body, body);
    assert_eq!(result.size, 5000);
    assert!(result.download_available);

    let id = result.download_id.expect("manifest over the limit is cached");
    assert_eq!(result.download_url, Some(format!("/download/{}", id)));
    let entry = cache.take(&id).unwrap();
    assert_eq!(entry.body, body.as_bytes());
    assert!(cache.take(&id).is_none());
}

#[tokio::test]
async fn test_manifest_served_as_video_stays_manifest() {
    let app = Router::new().route(
        "/stream",
        get(|| async { ([(CONTENT_TYPE, "video/mp2t")], "#EXTM3U\n#EXT-X-ENDLIST\n") }),
    );
    let base = start_mock_server(app).await;

    let result = probe(local_request(format!("{}/stream", base)), &ResponseCache::default()).await;
    assert!(result.is_manifest);
    assert!(!result.is_media);
    assert_eq!(result.body, "#EXTM3U\n#EXT-X-ENDLIST\n");
}

#[tokio::test]
async fn test_generic_body_truncation_boundary() {
    let app = Router::new()
        .route("/exact", get(|| async { "a".repeat(2000) }))
        .route("/over", get(|| async { "a".repeat(2001) }));
    let base = start_mock_server(app).await;
    let cache = ResponseCache::default();

    let exact = probe(local_request(format!("{}/exact", base)), &cache).await;
    assert!(!exact.truncated);
    assert!(!exact.download_available);
    assert_eq!(exact.body, "a".repeat(2000));

    let over = probe(local_request(format!("{}/over", base)), &cache).await;
    assert!(over.truncated);
    assert!(over.download_available);
    assert!(over.body.starts_with(&"a".repeat(2000)));
    assert!(over.body.contains("exceeded 2000 characters"));
    assert_eq!(over.size, 2001);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_media_content_type_is_summarized() {
    let app = Router::new().route(
        "/play",
        get(|| async { ([(CONTENT_TYPE, "video/x-flv")], vec![0u8; 4096]) }),
    );
    let base = start_mock_server(app).await;
    let cache = ResponseCache::default();

    let result = probe(local_request(format!("{}/play", base)), &cache).await;
    assert!(result.is_media);
    assert!(result.skip_body);
    assert!(!result.download_available);
    assert_eq!(result.file_type, FileType::Media);
    assert!(result.body.contains("File type: media file"));
    assert!(result.body.contains("Content type: video/x-flv"));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_large_body_is_summarized_and_not_cached() {
    let app = Router::new().route("/dump", get(|| async { "z".repeat(3 * 1024 * 1024) }));
    let base = start_mock_server(app).await;
    let cache = ResponseCache::default();

    let result = probe(local_request(format!("{}/dump", base)), &cache).await;
    assert_eq!(result.status_code, 200);
    assert!(result.is_large);
    assert!(result.skip_body);
    assert_eq!(result.file_type, FileType::LargeFile);
    assert_eq!(result.size, 3 * 1024 * 1024);
    assert!(result.body.contains("File size: 3 MB"));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_headers_lowercased() {
    let app = Router::new().route(
        "/h",
        get(|| async { ([("X-Custom-Header", "Value")], "ok") }),
    );
    let base = start_mock_server(app).await;

    let result = probe(local_request(format!("{}/h", base)), &ResponseCache::default()).await;
    assert_eq!(result.headers.get("x-custom-header").unwrap(), "Value");
    assert!(result.headers.keys().all(|k| k == &k.to_ascii_lowercase()));
}
