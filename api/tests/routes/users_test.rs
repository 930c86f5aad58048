use axum::http::StatusCode;
use db::models::module::ModuleVisibility;
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_module, create_user, make_test_app};

/// Test Case: The user directory is admin only.
#[tokio::test]
async fn user_list_requires_admin() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/users", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(build_request("GET", "/api/users", Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

/// Test Case: Role changes accept the known roles and reject anything else.
#[tokio::test]
async fn role_change_validates_role_name() {
    let (app, db) = make_test_app().await;
    let (user, _token) = create_user(&db, "a@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    let response = app
        .clone()
        .oneshot(build_request(
            "PUT",
            &format!("/api/users/{}/role", user.id),
            Some(&admin_token),
            Some(json!({ "role": "superuser" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Unknown role, expected one of: reviewer, student, admin"
    );

    let response = app
        .clone()
        .oneshot(build_request(
            "PUT",
            &format!("/api/users/{}/role", user.id),
            Some(&admin_token),
            Some(json!({ "role": "student" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "student");

    let response = app
        .oneshot(build_request(
            "PUT",
            "/api/users/999/role",
            Some(&admin_token),
            Some(json!({ "role": "student" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: An admin can release another user's selection, freeing the
/// seat. Releasing again reports that nothing was held.
#[tokio::test]
async fn admin_release_frees_the_seat() {
    let (app, db) = make_test_app().await;
    let (user, token) = create_user(&db, "a@example.com", false).await;
    let (_other, other_token) = create_user(&db, "b@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Full module", 1, ModuleVisibility::Active).await;

    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/users/{}/release", user.id),
            Some(&admin_token),
            Some(json!({ "module_id": module.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Selection released");

    // The seat is free again.
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&other_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(build_request(
            "POST",
            &format!("/api/users/{}/release", user.id),
            Some(&admin_token),
            Some(json!({ "module_id": module.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No active selection for this module");
}
