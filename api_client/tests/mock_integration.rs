use api_client::{ApiClient, ApiError, GenerationEvent};
use httpmock::prelude::*;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_list_images() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/images");
        then.status(200).json_body(serde_json::json!({
            "images": ["new.jpg", "cat.jpg"],
            "original_images": ["cat.jpg"]
        }));
    });

    let client = ApiClient::new(server.url(""));
    let listing = client.list_images().await.unwrap();
    assert_eq!(listing.images, vec!["new.jpg", "cat.jpg"]);
    assert!(listing.is_original("cat.jpg"));
    mock.assert();
}

#[tokio::test]
async fn test_check_features() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/check-features");
        then.status(200).json_body(serde_json::json!({"exists": true}));
    });

    let client = ApiClient::new(server.url(""));
    assert!(client.check_features().await.unwrap());
}

#[tokio::test]
async fn test_upload_image_sends_multipart() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/upload-image")
            .header_exists("content-type")
            .body_contains("filename=\"photo.jpg\"");
        then.status(200)
            .json_body(serde_json::json!({"success": true, "filename": "photo.jpg"}));
    });

    let client = ApiClient::new(server.url(""));
    client
        .upload_image("photo.jpg", b"jpegdata".to_vec())
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_delete_image_error_body_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/delete-image/cat.jpg");
        then.status(403)
            .json_body(serde_json::json!({"error": "Cannot delete original images"}));
    });

    let client = ApiClient::new(server.url(""));
    let err = client.delete_image("cat.jpg").await.unwrap_err();
    match err {
        ApiError::Server(message) => assert_eq!(message, "Cannot delete original images"),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_image_non_json_error_falls_back_to_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/api/delete-image/gone.jpg");
        then.status(404).body("not found");
    });

    let client = ApiClient::new(server.url(""));
    let err = client.delete_image("gone.jpg").await.unwrap_err();
    match err {
        ApiError::Server(message) => assert!(message.contains("404")),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_returns_ranked_hits() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/search")
            .body_contains("filename=\"query.jpg\"");
        then.status(200).json_body(serde_json::json!({
            "results": [
                {"filename": "cat.jpg", "image_url": "/images/cat.jpg", "similarity": 0.91},
                {"filename": "dog.jpg", "image_url": "/images/dog.jpg", "similarity": 0.42}
            ]
        }));
    });

    let client = ApiClient::new(server.url(""));
    let hits = client.search("query.jpg", b"img".to_vec()).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].filename, "cat.jpg");
    mock.assert();
}

#[tokio::test]
async fn test_fetch_image_bytes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/images/cat.jpg");
        then.status(200).body("binary-image");
    });

    let client = ApiClient::new(server.url(""));
    let bytes = client.fetch_image("cat.jpg").await.unwrap();
    assert_eq!(bytes, b"binary-image");
}

#[tokio::test]
async fn test_generate_features_forwards_progress_and_resolves_count() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-features");
        then.status(200).body(
            "data: {\"progress\": 50, \"current\": 1, \"total\": 2}\n\n\
             data: {\"current\": 2, \"total\": 2}\n\n\
             data: {\"complete\": true, \"count\": 2, \"original_count\": 50}\n\n",
        );
    });

    let client = ApiClient::new(server.url(""));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let count = client.generate_features(tx).await.unwrap();
    assert_eq!(count, 2);

    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            GenerationEvent::Progress { current: 1, total: 2 },
            GenerationEvent::Progress { current: 2, total: 2 },
            GenerationEvent::Complete { count: 2 },
        ]
    );
}

#[tokio::test]
async fn test_generate_features_error_event_fails_stream() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-features");
        then.status(200)
            .body("data: {\"error\": \"Failed to extract features from any images\"}\n\n");
    });

    let client = ApiClient::new(server.url(""));
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = client.generate_features(tx).await.unwrap_err();
    match err {
        ApiError::Stream(message) => {
            assert_eq!(message, "Failed to extract features from any images")
        }
        other => panic!("expected stream error, got {:?}", other),
    }
}
