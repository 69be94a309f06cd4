use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::Path;
use std::sync::Arc;
use tower::util::ServiceExt;
use voltura_core::event::NullSink;
use voltura_core::{digest, Version};
use voltura_node::api::CheckUpdateResponse;
use voltura_node::source::{build_router, scan_latest, Conduct, SourceState};

fn router(identity: &str, dir: &Path, conduct: Conduct) -> axum::Router {
    build_router(Arc::new(SourceState {
        identity: identity.to_string(),
        content_dir: dir.to_path_buf(),
        conduct,
        sink: Arc::new(NullSink),
    }))
}

async fn discover(app: axum::Router) -> CheckUpdateResponse {
    let resp = app
        .oneshot(Request::builder().uri("/check-update").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_discovery_empty_inventory() {
    let tmp = tempfile::tempdir().unwrap();
    let body = discover(router("oem", tmp.path(), Conduct::Honest)).await;

    assert_eq!(body.version, Version::ZERO);
    assert!(body.filename.is_none());
    assert!(body.checksum.is_none());
    assert_eq!(body.source, "oem");
}

#[tokio::test]
async fn test_discovery_picks_highest_version_and_hashes_it() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("firmware_v1.0.bin"), b"old").unwrap();
    std::fs::write(tmp.path().join("firmware_v1.2.bin"), b"new").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), b"ignored").unwrap();

    let body = discover(router("oem", tmp.path(), Conduct::Honest)).await;

    assert_eq!(body.version, Version::new(1, 2));
    assert_eq!(body.filename.as_deref(), Some("firmware_v1.2.bin"));
    assert_eq!(body.checksum.as_deref(), Some(digest::hash_bytes(b"new").as_str()));
    assert_eq!(body.source, "oem");
}

#[tokio::test]
async fn test_spoofing_source_lies_about_identity_and_digest() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("malicious_firmware_v1.3.bin"), b"payload").unwrap();

    let body = discover(router(
        "malicious",
        tmp.path(),
        Conduct::Spoofing { claims: "oem".to_string() },
    ))
    .await;

    // Claims the trusted identity, and the digest is fabricated: it is not
    // the hash of the bytes it will actually serve.
    assert_eq!(body.source, "oem");
    assert_eq!(body.checksum.as_deref(), Some(digest::forged().as_str()));
    assert_ne!(body.checksum.as_deref(), Some(digest::hash_bytes(b"payload").as_str()));
    assert_eq!(body.version, Version::new(1, 3));
}

#[tokio::test]
async fn test_spoofing_source_keeps_cover_when_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let body = discover(router(
        "malicious",
        tmp.path(),
        Conduct::Spoofing { claims: "oem".to_string() },
    ))
    .await;

    assert_eq!(body.version, Version::ZERO);
    assert_eq!(body.source, "oem");
}

#[tokio::test]
async fn test_download_streams_exact_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("firmware_v1.1.bin"), b"exact payload bytes").unwrap();

    let resp = router("oem", tmp.path(), Conduct::Honest)
        .oneshot(
            Request::builder()
                .uri("/download/firmware_v1.1.bin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let declared_len: u64 = resp
        .headers()
        .get("content-length")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"exact payload bytes");
    assert_eq!(declared_len, bytes.len() as u64);
}

#[tokio::test]
async fn test_download_unknown_file_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let resp = router("oem", tmp.path(), Conduct::Honest)
        .oneshot(
            Request::builder()
                .uri("/download/firmware_v9.9.bin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_scan_latest_ignores_unversioned_files() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("README.md"), b"docs").unwrap();
    assert!(scan_latest(tmp.path()).unwrap().is_none());

    std::fs::write(tmp.path().join("firmware_v2.0.bin"), b"fw").unwrap();
    let (name, version) = scan_latest(tmp.path()).unwrap().unwrap();
    assert_eq!(name, "firmware_v2.0.bin");
    assert_eq!(version, Version::new(2, 0));
}
