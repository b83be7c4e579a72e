//! Integration tests for huemood-gen API endpoints
//!
//! Tests cover:
//! - Request validation (400)
//! - Missing credentials (500, or 200 with warning when allowed)
//! - Successful generation with a failing model (fallback palettes)
//! - A panicking generation task (500)
//! - Health endpoint

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

use helpers::{fast_settings, test_orchestrator, ScriptedGenerator, PSYCHOLOGY_PROMPT_MARKER};
use huemood_gen::services::GeneratorSet;
use huemood_gen::{build_router, AppState};

/// Test helper: app whose model always fails
fn setup_app() -> axum::Router {
    setup_app_with(Some(GeneratorSet::uniform(Arc::new(
        ScriptedGenerator::always_failing(),
    ))))
}

fn setup_app_with(generators: Option<GeneratorSet>) -> axum::Router {
    let orchestrator = Arc::new(test_orchestrator(fast_settings()));
    build_router(AppState::new(orchestrator, generators))
}

/// Test helper: POST JSON to the generation endpoint
fn generate_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generatePalettes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_prompt_is_bad_request() {
    let response = setup_app()
        .oneshot(generate_request(json!({ "mode": "prompt" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Prompt is required");
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let response = setup_app()
        .oneshot(generate_request(json!({ "mode": "image", "promptText": "x" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Image is required");
}

#[tokio::test]
async fn test_palette_size_out_of_range_is_bad_request() {
    let response = setup_app()
        .oneshot(generate_request(json!({ "promptText": "x", "paletteSize": 7 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/generatePalettes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_validation_precedes_credentials_check() {
    let response = setup_app_with(None)
        .oneshot(generate_request(json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_missing_credentials_is_server_error() {
    let response = setup_app_with(None)
        .oneshot(generate_request(json!({ "promptText": "sunset" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["message"],
        "Internal Server Error: text generation client initialization failed."
    );
}

#[tokio::test]
async fn test_missing_credentials_with_fallback_allowed() {
    let orchestrator = Arc::new(test_orchestrator(fast_settings()));
    let app =
        build_router(AppState::new(orchestrator, None).with_fallback_without_credentials(true));

    let response = app
        .oneshot(generate_request(json!({ "promptText": "sunset" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["warning"].is_string());
    assert_eq!(body["palettes"].as_array().unwrap().len(), 6);
}

// =============================================================================
// Generation
// =============================================================================

#[tokio::test]
async fn test_generation_with_failing_model_returns_fallback_palettes() {
    let response = setup_app()
        .oneshot(generate_request(json!({ "promptText": "sunset beach" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body.get("warning").is_none());

    let palettes = body["palettes"].as_array().unwrap();
    assert_eq!(palettes.len(), 6);

    let calm = &palettes[0];
    assert_eq!(calm["emotion"], "Calm");
    assert_eq!(calm["colors"][0]["psychology"]["emotion"], "Calm");
    assert_eq!(calm["name"], "Calm sunset beach");
    assert_eq!(calm["colors"].as_array().unwrap().len(), 5);
    assert_eq!(calm["colors"][0]["hex"], "#E6EFF6");
    assert_eq!(calm["colors"][0]["rgb"], "rgb(230,239,246)");
    assert_eq!(calm["colors"][0]["name"], "Calm Primary");
    assert_eq!(calm["colors"][0]["psychology"]["associations"].as_array().unwrap().len(), 3);
    assert!(calm["accessibility"]["contrast"].is_string());
    assert_eq!(calm["accessibility"]["colorBlindness"], "Moderate");
    assert!(calm["accessibility"]["wcag"]["normal"].is_string());
}

#[tokio::test]
async fn test_legacy_field_names_are_accepted() {
    let generator = Arc::new(ScriptedGenerator::always_failing());
    let app = setup_app_with(Some(GeneratorSet::uniform(generator.clone())));

    let response = app
        .oneshot(generate_request(json!({
            "prompt": "forest",
            "userEmotions": ["Love"],
            "paletteSize": 2
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let palettes = body["palettes"].as_array().unwrap();
    assert_eq!(palettes.len(), 1);
    assert_eq!(palettes[0]["emotion"], "Love");
    assert_eq!(palettes[0]["colors"].as_array().unwrap().len(), 2);
    assert_eq!(generator.calls_containing(PSYCHOLOGY_PROMPT_MARKER), 2);
}

#[tokio::test]
async fn test_panicking_generation_is_internal_error() {
    let generator = ScriptedGenerator::new(|_| panic!("generator blew up"));
    let app = setup_app_with(Some(GeneratorSet::uniform(Arc::new(generator))));

    let response = app
        .oneshot(generate_request(json!({ "promptText": "sunset" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "Failed to generate palettes");
    assert!(body["error"].as_str().unwrap().contains("task failed"));
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "huemood-gen");
    assert_eq!(body["cache_backend"], "memory");
    assert_eq!(body["credentials_configured"], true);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_degraded_without_credentials() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = setup_app_with(None).oneshot(request).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["credentials_configured"], false);
}
