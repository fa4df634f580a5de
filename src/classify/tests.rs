// Content classifier tests.

use super::*;

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn classify_with(url: &str, pairs: &[(&str, &str)], body: &[u8]) -> Classification {
    let headers = headers(pairs);
    classify(&ContentProbe {
        original_url: url,
        final_url: url,
        headers: &headers,
        body,
    })
}

#[test]
fn test_manifest_by_extension() {
    let c = classify_with("http://cdn.test/live/index.m3u8?token=abc", &[], b"");
    assert!(c.is_manifest);
    assert!(!c.is_media);

    let c = classify_with("http://cdn.test/list.M3U", &[], b"");
    assert!(c.is_manifest);
}

#[test]
fn test_manifest_by_content_type() {
    for ct in [
        "application/vnd.apple.mpegurl",
        "application/x-mpegURL; charset=utf-8",
        "audio/x-mpegurl",
    ] {
        let c = classify_with("http://cdn.test/play", &[("content-type", ct)], b"");
        assert!(c.is_manifest, "{} should be a manifest", ct);
        assert!(!c.is_media, "{} must not be media", ct);
    }
}

#[test]
fn test_manifest_marker_beats_media_content_type() {
    let body = b"\n  #EXTM3U\n#EXT-X-VERSION:3\n";
    let c = classify_with(
        "http://cdn.test/stream",
        &[("content-type", "video/mp2t")],
        body,
    );
    assert!(c.is_manifest);
    assert!(!c.is_media);
    assert_eq!(c.file_type(), FileType::Manifest);
    assert!(!c.skips_body());
}

#[test]
fn test_manifest_marker_beats_media_extension() {
    let c = classify_with("http://cdn.test/segment.ts", &[], b"#EXTM3U\n#EXTINF:10,\na.ts\n");
    assert!(c.is_manifest);
    assert!(!c.is_media);
}

#[test]
fn test_media_by_extension() {
    for url in [
        "http://cdn.test/movie.mp4",
        "http://cdn.test/live.FLV",
        "http://cdn.test/a/b/seg-001.ts?x=1",
        "http://cdn.test/song.mp3",
        "http://cdn.test/manifest.mpd",
    ] {
        let c = classify_with(url, &[], b"");
        assert!(c.is_media, "{} should be media", url);
        assert_eq!(c.file_type(), FileType::Media);
        assert!(c.skips_body());
    }
}

#[test]
fn test_media_by_content_type() {
    let c = classify_with("http://cdn.test/play", &[("content-type", "Video/MP4")], b"");
    assert!(c.is_media);
    let c = classify_with("http://cdn.test/play", &[("content-type", "audio/aac")], b"");
    assert!(c.is_media);
}

#[test]
fn test_media_by_original_url_only() {
    let headers = HeaderMap::new();
    let c = classify(&ContentProbe {
        original_url: "http://cdn.test/movie.mp4",
        final_url: "http://edge.test/abc",
        headers: &headers,
        body: b"",
    });
    assert!(c.is_media);
}

#[test]
fn test_manifest_extension_only_checked_on_final_url() {
    let headers = HeaderMap::new();
    let c = classify(&ContentProbe {
        original_url: "http://cdn.test/live.m3u8",
        final_url: "http://edge.test/login",
        headers: &headers,
        body: b"<html></html>",
    });
    assert!(!c.is_manifest);
}

#[test]
fn test_generic_content() {
    let c = classify_with(
        "http://api.test/v1/status",
        &[("content-type", "application/json")],
        br#"{"ok":true}"#,
    );
    assert_eq!(c, Classification::default());
    assert_eq!(c.file_type(), FileType::Generic);
    assert!(!c.skips_body());
}

#[test]
fn test_large_by_declared_length() {
    let c = classify_with(
        "http://cdn.test/dump",
        &[("content-length", "2097153")],
        b"",
    );
    assert!(c.is_large);
    assert_eq!(c.file_type(), FileType::LargeFile);

    let c = classify_with(
        "http://cdn.test/dump",
        &[("content-length", "2097152")],
        b"",
    );
    assert!(!c.is_large);
}

#[test]
fn test_large_by_captured_length() {
    let body = vec![b'x'; LARGE_BODY_THRESHOLD + 1];
    let c = classify_with("http://cdn.test/dump", &[], &body);
    assert!(c.is_large);
    assert!(c.skips_body());
}

#[test]
fn test_large_manifest_keeps_body() {
    let mut body = b"#EXTM3U\n".to_vec();
    body.resize(LARGE_BODY_THRESHOLD + 10, b'#');
    let c = classify_with("http://cdn.test/big", &[], &body);
    assert!(c.is_manifest);
    assert!(c.is_large);
    assert!(!c.skips_body());
    assert_eq!(c.file_type(), FileType::Manifest);
}

#[test]
fn test_manifest_marker_incremental() {
    assert_eq!(manifest_marker(b""), None);
    assert_eq!(manifest_marker(b"   \r\n"), None);
    assert_eq!(manifest_marker(b"#EXT"), None);
    assert_eq!(manifest_marker(b"  #EXTM"), None);
    assert_eq!(manifest_marker(b"#EXTM3U"), Some(true));
    assert_eq!(manifest_marker(b"#EXTINF"), Some(false));
    assert_eq!(manifest_marker(b"<html>"), Some(false));
    assert_eq!(manifest_marker(b"{"), Some(false));
}

#[test]
fn test_declared_length_parsing() {
    assert_eq!(declared_length(&headers(&[("content-length", " 42 ")])), Some(42));
    assert_eq!(declared_length(&headers(&[("content-length", "abc")])), None);
    assert_eq!(declared_length(&HeaderMap::new()), None);
}

#[test]
fn test_unparseable_url_still_checks_suffix() {
    assert!(is_media_url("not a url/movie.mp4?x"));
    assert!(is_manifest_url("relative/path/list.m3u8#frag"));
}
