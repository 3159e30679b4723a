use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot`

use api_ingress::{ApiIngress, ApiIngressConfig};
use apikit::request_id::XRequestId;
use apikit::ApiError;

#[tokio::test]
async fn generates_request_id_when_missing() {
    let app = test_app(ApiIngressConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let header_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("x-request-id should be generated");
    assert!(!header_id.is_empty());

    // handler saw the same id through extensions
    let json = body_json(response).await;
    assert_eq!(json["request_id"], header_id);
}

#[tokio::test]
async fn preserves_incoming_request_id() {
    let app = test_app(ApiIngressConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/test")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("abc-123"));
}

#[tokio::test]
async fn error_envelope_keeps_request_id_header() {
    let app = test_app(ApiIngressConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/error")
                .header("x-request-id", "error-test-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("error-test-123"));

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "InternalServerError");
    assert_eq!(json["message"], "An internal error occurred");
}

#[tokio::test]
async fn health_endpoint_is_always_mounted() {
    let app = test_app(ApiIngressConfig::default());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn openapi_served_only_when_docs_enabled() {
    let doc = json!({ "openapi": "3.1.0", "info": { "title": "t", "version": "1" } });

    let disabled = ApiIngress::new(ApiIngressConfig::default())
        .with_openapi(doc.clone())
        .build_router(routes())
        .unwrap();
    let response = disabled
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let enabled = ApiIngress::new(ApiIngressConfig {
        enable_docs: true,
        ..Default::default()
    })
    .with_openapi(doc)
    .build_router(routes())
    .unwrap();
    let response = enabled
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["info"]["title"], "t");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app(ApiIngressConfig {
        body_limit_mb: 1,
        ..Default::default()
    });
    let big = vec![b'a'; 2 * 1024 * 1024];
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header("content-length", big.len())
                .body(Body::from(big))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = test_app(ApiIngressConfig {
        cors_origin: Some("http://localhost:3000".into()),
        ..Default::default()
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/test")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

fn routes() -> Router {
    Router::new()
        .route("/test", get(success_handler))
        .route("/error", get(error_handler))
        .route("/echo", post(echo_handler))
}

fn test_app(config: ApiIngressConfig) -> Router {
    ApiIngress::new(config).build_router(routes()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn success_handler(
    Extension(XRequestId(request_id)): Extension<XRequestId>,
) -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "request_id": request_id}))
}

async fn error_handler() -> ApiError {
    ApiError::internal()
}

async fn echo_handler(body: String) -> String {
    body
}
