//! File upload and download integration tests.
//!
//! Tests verify:
//! - Uploaded bytes are stored verbatim and served back unchanged
//! - Malformed multipart bodies are rejected with 400
//! - Files already on disk are served after a restart
//! - Oversized bodies are rejected with 413

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use record_gate::RouterConfig;

use super::test_utils::{
    binary_payload, empty_request, json_request, multipart_body, upload_request, valid_token,
    TestApp, TEST_BOUNDARY, TEST_SECRET,
};

/// Upload `body` and return the assigned id.
async fn upload(app: &TestApp, token: &str, body: Vec<u8>) -> u64 {
    let (status, response) = app.send_json(upload_request(Some(token), body)).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", response);
    assert_eq!(response["message"], "File uploaded successfully");
    response["id"].as_u64().expect("numeric id")
}

// =============================================================================
// Upload / Download
// =============================================================================

#[tokio::test]
async fn test_binary_upload_round_trip() {
    let app = TestApp::new().await;
    let token = valid_token();
    let payload = binary_payload();

    let id = upload(
        &app,
        &token,
        multipart_body("blob.bin", "application/octet-stream", &payload),
    )
    .await;

    let request = empty_request(Method::GET, &format!("/file/{}", id), Some(&token));
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        payload.len().to_string().as_str()
    );

    let (status, body) = app
        .send(empty_request(Method::GET, &format!("/file/{}", id), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_upload_writes_file_named_by_id() {
    let app = TestApp::new().await;
    let token = valid_token();

    let id = upload(&app, &token, multipart_body("photo.png", "image/png", b"png")).await;

    let stored = app.storage_path().join(format!("{}.png", id));
    assert_eq!(std::fs::read(stored).unwrap(), b"png");
}

#[tokio::test]
async fn test_upload_without_filename_has_no_extension() {
    let app = TestApp::new().await;
    let token = valid_token();

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nplain\r\n--{b}--\r\n",
        b = TEST_BOUNDARY
    );
    let id = upload(&app, &token, body.into_bytes()).await;

    let stored = app.storage_path().join(id.to_string());
    assert_eq!(std::fs::read(stored).unwrap(), b"plain");
}

#[tokio::test]
async fn test_uploads_get_distinct_ids() {
    let app = TestApp::new().await;
    let token = valid_token();

    let first = upload(&app, &token, multipart_body("a.txt", "text/plain", b"a")).await;
    let second = upload(&app, &token, multipart_body("b.txt", "text/plain", b"b")).await;
    assert!(second > first);

    let (_, body) = app
        .send(empty_request(Method::GET, &format!("/file/{}", first), Some(&token)))
        .await;
    assert_eq!(body.as_ref(), b"a");
}

#[tokio::test]
async fn test_empty_file_upload() {
    let app = TestApp::new().await;
    let token = valid_token();

    let id = upload(&app, &token, multipart_body("empty.txt", "text/plain", b"")).await;

    let (status, body) = app
        .send(empty_request(Method::GET, &format!("/file/{}", id), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

// =============================================================================
// Malformed Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_without_boundary_rejected() {
    let app = TestApp::new().await;
    let token = valid_token();

    for content_type in [None, Some("application/json"), Some("multipart/form-data")] {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/file")
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder
            .body(Body::from(multipart_body("a.txt", "text/plain", b"a")))
            .unwrap();

        let (status, body) = app.send_json(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "content type {:?}", content_type);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_upload_with_invalid_body_rejected() {
    let app = TestApp::new().await;
    let token = valid_token();

    let bodies = [
        b"not multipart at all".to_vec(),
        format!("--{}\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\ndata", TEST_BOUNDARY)
            .into_bytes(),
        format!("--{}\r\nno header terminator", TEST_BOUNDARY).into_bytes(),
        Vec::new(),
    ];

    for body in bodies {
        let (status, _) = app.send_json(upload_request(Some(&token), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    assert_eq!(std::fs::read_dir(app.storage_path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_larger_than_limit_rejected() {
    let app =
        TestApp::with_config(RouterConfig::new(TEST_SECRET).with_max_body_bytes(1024)).await;
    let token = valid_token();

    let payload = vec![b'x'; 4096];
    let (status, body) = app
        .send_json(upload_request(
            Some(&token),
            multipart_body("big.bin", "application/octet-stream", &payload),
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["message"].is_string());
}

// =============================================================================
// Download Errors
// =============================================================================

#[tokio::test]
async fn test_download_unknown_id_returns_404() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send_json(empty_request(Method::GET, "/file/999", Some(&valid_token())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found");
}

#[tokio::test]
async fn test_download_file_removed_from_disk_returns_500() {
    let app = TestApp::new().await;
    let token = valid_token();

    let id = upload(&app, &token, multipart_body("gone.txt", "text/plain", b"x")).await;
    std::fs::remove_file(app.storage_path().join(format!("{}.txt", id))).unwrap();

    let (status, body) = app
        .send_json(empty_request(Method::GET, &format!("/file/{}", id), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let message = body["message"].as_str().unwrap();
    assert!(!message.contains(app.storage_path().to_str().unwrap()));
}

// =============================================================================
// Rehydration
// =============================================================================

#[tokio::test]
async fn test_files_on_disk_are_served_after_restart() {
    let storage = tempfile::tempdir().unwrap();
    std::fs::write(storage.path().join("123.txt"), b"hello").unwrap();
    std::fs::write(storage.path().join("notes.md"), b"skipped").unwrap();

    let app = TestApp::with_storage(storage, RouterConfig::new(TEST_SECRET)).await;
    let token = valid_token();

    let (status, body) = app
        .send(empty_request(Method::GET, "/file/123", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"hello");
}

#[tokio::test]
async fn test_new_ids_exceed_rehydrated_ids() {
    let storage = tempfile::tempdir().unwrap();
    let far_future = 9_000_000_000_000u64;
    std::fs::write(storage.path().join(far_future.to_string()), b"old").unwrap();

    let app = TestApp::with_storage(storage, RouterConfig::new(TEST_SECRET)).await;
    let token = valid_token();

    let id = upload(&app, &token, multipart_body("new.txt", "text/plain", b"new")).await;
    assert!(id > far_future);

    let (_, body) = app
        .send(empty_request(Method::GET, &format!("/file/{}", far_future), Some(&token)))
        .await;
    assert_eq!(body.as_ref(), b"old");
}

#[tokio::test]
async fn test_exhausted_ids_return_500() {
    let storage = tempfile::tempdir().unwrap();
    std::fs::write(storage.path().join(u64::MAX.to_string()), b"last").unwrap();

    let app = TestApp::with_storage(storage, RouterConfig::new(TEST_SECRET)).await;
    let token = valid_token();

    let (status, body) = app
        .send_json(json_request(Method::POST, "/data", Some(&token), &json!({"x": 1})))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send_json(upload_request(
            Some(&token),
            multipart_body("a.txt", "text/plain", b"a"),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The file already on disk is still served.
    let (status, body) = app
        .send(empty_request(Method::GET, &format!("/file/{}", u64::MAX), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"last");
}
