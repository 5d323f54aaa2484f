/// Integration tests for the ImageKit client against a local stand-in server

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use picstream_shared::media::{
    ImageKitClient, ImageKitConfig, MediaError, MediaStore, UploadRequest, BACKEND_UPLOAD_TAG,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// base64("private_test:")
const EXPECTED_AUTH: &str = "Basic cHJpdmF0ZV90ZXN0Og==";

#[derive(Clone, Default)]
struct Received {
    fields: Arc<Mutex<HashMap<String, String>>>,
    file: Arc<Mutex<Option<(String, Option<String>, Vec<u8>)>>>,
}

async fn fake_upload(
    State(received): State<Received>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != EXPECTED_AUTH {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Your account cannot be authenticated." })),
        );
    }

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.unwrap().to_vec();
            *received.file.lock().unwrap() = Some((file_name, content_type, bytes));
        } else {
            let value = field.text().await.unwrap();
            received.fields.lock().unwrap().insert(name, value);
        }
    }

    let file_name = received.fields.lock().unwrap()["fileName"].clone();
    let stored = file_name.replace(".jpg", "_Xy12.jpg");
    (
        StatusCode::OK,
        Json(json!({
            "fileId": "65f1c0ffee",
            "name": stored,
            "url": format!("https://ik.imagekit.io/test/{}", stored),
            "fileType": "image",
            "size": 5,
        })),
    )
}

async fn spawn_server() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/api/v1/files/upload", post(fake_upload))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/v1/files/upload", addr), received)
}

fn client(upload_url: String, private_key: &str) -> ImageKitClient {
    let mut config = ImageKitConfig::new(private_key, "public_test", "https://ik.imagekit.io/test");
    config.upload_url = upload_url;
    config.timeout = Some(std::time::Duration::from_secs(10));
    ImageKitClient::new(config).unwrap()
}

fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), contents).unwrap();
    file
}

#[tokio::test]
async fn test_upload_sends_form_and_decodes_response() {
    let (url, received) = spawn_server().await;
    let store = client(url, "private_test");
    let file = temp_file(b"hello");

    let uploaded = store
        .upload(
            UploadRequest::new(file.path().to_path_buf(), "beach.jpg")
                .with_content_type(Some("image/jpeg".to_string())),
        )
        .await
        .unwrap();

    assert!(uploaded.is_ok());
    assert_eq!(uploaded.name, "beach_Xy12.jpg");
    assert_eq!(uploaded.url, "https://ik.imagekit.io/test/beach_Xy12.jpg");
    assert_eq!(uploaded.file_id, "65f1c0ffee");
    assert_eq!(uploaded.size, Some(5));

    let fields = received.fields.lock().unwrap().clone();
    assert_eq!(fields["fileName"], "beach.jpg");
    assert_eq!(fields["useUniqueFileName"], "true");
    assert_eq!(fields["tags"], BACKEND_UPLOAD_TAG);

    let (file_name, content_type, bytes) = received.file.lock().unwrap().clone().unwrap();
    assert_eq!(file_name, "beach.jpg");
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn test_rejected_upload_reports_status() {
    let (url, _received) = spawn_server().await;
    let store = client(url, "wrong_key");
    let file = temp_file(b"hello");

    let err = store
        .upload(UploadRequest::new(file.path().to_path_buf(), "beach.jpg"))
        .await
        .unwrap_err();

    match err {
        MediaError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("cannot be authenticated"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service() {
    // Nothing listens on the discard port
    let store = client("http://127.0.0.1:9/upload".to_string(), "private_test");
    let file = temp_file(b"hello");

    let result = store
        .upload(UploadRequest::new(file.path().to_path_buf(), "beach.jpg"))
        .await;

    assert!(matches!(result, Err(MediaError::Request(_))));
}
