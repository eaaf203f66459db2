//! Gemini client tests against a mock server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use vidverify_gemini::{FileState, GeminiClient, GeminiConfig, GeminiError, GeminiFile, UploadProgress};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    let config = GeminiConfig::new("test-key")
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(10))
        .with_max_retries(1);
    GeminiClient::new(config).expect("client")
}

fn file_json(name: &str, state: &str) -> Value {
    json!({
        "name": name,
        "displayName": "clip.mp4",
        "mimeType": "video/mp4",
        "sizeBytes": "11",
        "uri": format!("https://generativelanguage.googleapis.com/v1beta/{}", name),
        "state": state
    })
}

fn active_file(name: &str, mime: &str) -> GeminiFile {
    GeminiFile {
        name: name.to_string(),
        display_name: None,
        mime_type: mime.to_string(),
        size_bytes: None,
        uri: format!("https://example.test/{}", name),
        state: FileState::Active,
        error: None,
    }
}

#[tokio::test]
async fn test_resumable_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("X-Goog-Upload-Protocol", "resumable"))
        .and(header("X-Goog-Upload-Command", "start"))
        .and(header("X-Goog-Upload-Header-Content-Length", "11"))
        .and(header("X-Goog-Upload-Header-Content-Type", "video/mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .and(header("X-Goog-Upload-Offset", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "file": file_json("files/abc", "PROCESSING") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    tokio::fs::write(&video, b"hello video").await.unwrap();

    let sent = Arc::new(AtomicU64::new(0));
    let sent_cb = sent.clone();
    let progress: UploadProgress = Arc::new(move |n| sent_cb.store(n, Ordering::SeqCst));

    let client = client_for(&server);
    let file = client.upload_file(&video, Some(progress)).await.unwrap();

    assert_eq!(file.name, "files/abc");
    assert_eq!(file.state, FileState::Processing);
    assert_eq!(file.mime_type, "video/mp4");
    assert_eq!(sent.load(Ordering::SeqCst), 11);

    let requests = server.received_requests().await.unwrap();
    let start_body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(start_body["file"]["display_name"], "clip.mp4");
    assert_eq!(requests[1].body, b"hello video");
}

#[tokio::test]
async fn test_upload_without_session_url_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("ref.jpg");
    tokio::fs::write(&photo, b"jpeg").await.unwrap();

    let err = client_for(&server).upload_file(&photo, None).await.unwrap_err();
    assert!(matches!(err, GeminiError::Upload(_)));
}

#[tokio::test]
async fn test_wait_until_active_polls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("files/abc", "PROCESSING")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("files/abc", "ACTIVE")))
        .mount(&server)
        .await;

    let uploaded: GeminiFile = serde_json::from_value(file_json("files/abc", "PROCESSING")).unwrap();

    let mut ticks = 0;
    let file = client_for(&server)
        .wait_until_active(uploaded, |_| ticks += 1)
        .await
        .unwrap();

    assert_eq!(file.state, FileState::Active);
    assert_eq!(ticks, 2);
}

#[tokio::test]
async fn test_wait_reports_failed_processing() {
    let server = MockServer::start().await;
    let mut failed = file_json("files/bad", "FAILED");
    failed["error"] = json!({ "code": 3, "message": "unsupported codec" });

    let file: GeminiFile = serde_json::from_value(failed).unwrap();
    let err = client_for(&server)
        .wait_until_active(file, |_| {})
        .await
        .unwrap_err();

    match err {
        GeminiError::FileFailed { name, message } => {
            assert_eq!(name, "files/bad");
            assert_eq!(message, "unsupported codec");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_wait_times_out() {
    let server = MockServer::start().await;
    let config = GeminiConfig::new("test-key")
        .with_base_url(server.uri())
        .with_processing_timeout(Duration::ZERO);
    let client = GeminiClient::new(config).unwrap();

    let file: GeminiFile = serde_json::from_value(file_json("files/slow", "PROCESSING")).unwrap();
    let err = client.wait_until_active(file, |_| {}).await.unwrap_err();

    assert!(matches!(err, GeminiError::ProcessingTimeout { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_file_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("files/abc", "ACTIVE")))
        .expect(1)
        .mount(&server)
        .await;

    let file = tokio_test::assert_ok!(client_for(&server).get_file("files/abc").await);
    assert_eq!(file.state, FileState::Active);
}

#[tokio::test]
async fn test_generate_content_sends_prompt_then_files() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "Same person.\n" },
                    { "text": "EVIDENCE_TIMESTAMPS: [00:09.15]" }
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12000,
                "candidatesTokenCount": 850,
                "totalTokenCount": 12850
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![
        active_file("files/ref", "image/jpeg"),
        active_file("files/vid", "video/mp4"),
    ];
    let output = client_for(&server)
        .generate_content("gemini-2.5-pro", "Analyze this.", &files)
        .await
        .unwrap();

    assert_eq!(output.text, "Same person.\nEVIDENCE_TIMESTAMPS: [00:09.15]");
    assert_eq!(output.model, "gemini-2.5-pro");
    assert_eq!(output.finish_reason.as_deref(), Some("STOP"));
    let usage = output.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 12000);
    assert_eq!(usage.output_tokens, 850);
    assert_eq!(usage.total_tokens, 12850);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["text"], "Analyze this.");
    assert_eq!(parts[1]["fileData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[2]["fileData"]["fileUri"], "https://example.test/files/vid");
}

#[tokio::test]
async fn test_generate_content_blocked_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content("gemini-2.5-pro", "prompt", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GeminiError::Blocked(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn test_api_error_message_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content("gemini-2.5-pro", "prompt", &[])
        .await
        .unwrap_err();

    match err {
        GeminiError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_generate_with_fallback_uses_next_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = vec!["gemini-2.5-pro".to_string(), "gemini-2.5-flash".to_string()];
    let output = client_for(&server)
        .generate_with_fallback(&models, "prompt", &[])
        .await
        .unwrap();

    assert_eq!(output.model, "gemini-2.5-flash");
    assert_eq!(output.text, "ok");
    assert!(output.usage.is_none());
}

#[tokio::test]
async fn test_delete_file() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    tokio_test::assert_ok!(client_for(&server).delete_file("files/abc").await);
}
