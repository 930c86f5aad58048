use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_user, make_test_app};

/// Test Case: A missing bearer token is rejected.
#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(build_request("GET", "/api/auth/me", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test Case: A valid token returns the caller's own account.
#[tokio::test]
async fn me_returns_current_user() {
    let (app, db) = make_test_app().await;
    let (user, token) = create_user(&db, "sam@example.com", false).await;

    let response = app
        .oneshot(build_request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["email"], "sam@example.com");
    assert_eq!(json["data"]["role"], "reviewer");
    assert_eq!(json["data"]["reminder_enabled"], true);
}

/// Test Case: A token for a deleted account maps to not found, not a panic.
#[tokio::test]
async fn me_with_stale_token_is_not_found() {
    let (app, db) = make_test_app().await;
    let (user, token) = create_user(&db, "gone@example.com", false).await;

    use sea_orm::{EntityTrait, ModelTrait};
    let account = db::models::user::Entity::find_by_id(user.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    account.delete(&db).await.unwrap();

    let response = app
        .oneshot(build_request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: Login rejects an empty id_token before talking to Google.
#[tokio::test]
async fn login_with_empty_token_fails_validation() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "id_token": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "id_token is required");
}
