use axum::http::StatusCode;
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, make_test_app};

/// Test Case: The health endpoint answers without authentication.
#[tokio::test]
async fn health_check_returns_ok_json() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(build_request("GET", "/api/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
    assert_eq!(json["message"], "Service healthy");
}
