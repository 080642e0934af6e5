//! Fatal-path behavior: the only two conditions the API rejects, with the
//! structured error body. No credentials are configured here, so any
//! outbound call would fail loudly; the assertions below never get that
//! far because validation happens first.

use std::sync::Once;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use vibelens_backend::router;

fn setup_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        std::env::set_var("GEMINI_API_KEY", "");
        std::env::set_var("QLOO_API_KEY", "");
    });
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    setup_env();
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn analyze_without_image_is_a_400() {
    let (status, body) = post_json("/api/analyze", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_input");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn analyze_with_blank_image_is_a_400() {
    let (status, body) = post_json("/api/analyze", json!({ "imageBase64": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_input");
}

#[tokio::test]
async fn analyze_movie_with_empty_name_is_a_400() {
    let (status, body) = post_json("/api/analyze-movie", json!({ "movieName": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_input");
    assert!(body["details"].as_str().unwrap().contains("movieName"));
}

#[tokio::test]
async fn analyze_without_credential_is_a_500_configuration_error() {
    let (status, body) =
        post_json("/api/analyze", json!({ "imageBase64": "aGVsbG8gd29ybGQ=" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "missing_credential");
    assert!(body["details"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn analyze_movie_without_credential_is_a_500_configuration_error() {
    let (status, body) = post_json("/api/analyze-movie", json!({ "movieName": "Dune" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "missing_credential");
}
