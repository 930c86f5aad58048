use axum::http::StatusCode;
use db::models::module::ModuleVisibility;
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_module, create_user, make_test_app};

/// Test Case: Draft and archived modules are hidden from regular users but
/// visible to admins.
#[tokio::test]
async fn listing_hides_unpublished_modules_from_users() {
    let (app, db) = make_test_app().await;
    let (_user, user_token) = create_user(&db, "reviewer@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    create_module(&db, "Draft week", 3, ModuleVisibility::Draft).await;
    create_module(&db, "Pilot week", 3, ModuleVisibility::PilotReview).await;
    create_module(&db, "Active week", 3, ModuleVisibility::Active).await;
    create_module(&db, "Old week", 3, ModuleVisibility::Archived).await;

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/modules", Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(build_request("GET", "/api/modules", Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);
}

/// Test Case: A hidden module's detail page behaves as missing for users.
#[tokio::test]
async fn hidden_module_detail_is_not_found_for_users() {
    let (app, db) = make_test_app().await;
    let (_user, user_token) = create_user(&db, "reviewer@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Draft week", 3, ModuleVisibility::Draft).await;

    let uri = format!("/api/modules/{}", module.id);
    let response = app
        .clone()
        .oneshot(build_request("GET", &uri, Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(build_request("GET", &uri, Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visibility"], "draft");
    // Admin view carries the drive wiring fields.
    assert!(json["data"].get("drive_file_id").is_some());
}

/// Test Case: Module creation is admin-only and starts in draft.
#[tokio::test]
async fn create_module_requires_admin() {
    let (app, db) = make_test_app().await;
    let (_user, user_token) = create_user(&db, "reviewer@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    let body = json!({
        "title": "Ownership & Borrowing",
        "week_number": 3,
        "capacity": 5
    });

    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/modules",
            Some(&user_token),
            Some(body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/modules",
            Some(&admin_token),
            Some(body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visibility"], "draft");
    assert_eq!(json["data"]["occupancy"], 0);
    assert_eq!(json["data"]["seats_left"], 5);
    assert_eq!(json["data"]["max_points"], 100);
}

/// Test Case: Out-of-range fields are rejected with a validation error.
#[tokio::test]
async fn create_module_rejects_invalid_week() {
    let (app, db) = make_test_app().await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/modules",
            Some(&admin_token),
            Some(json!({ "title": "Bad", "week_number": 0, "capacity": 5 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Week number must be between 1 and 52");
}

/// Test Case: The full seat lifecycle. The last seat can only be won once,
/// a second selection by the same user conflicts, and releasing frees the
/// seat for someone else.
#[tokio::test]
async fn select_and_release_lifecycle() {
    let (app, db) = make_test_app().await;
    let (_a, token_a) = create_user(&db, "a@example.com", false).await;
    let (_b, token_b) = create_user(&db, "b@example.com", false).await;
    let module = create_module(&db, "Active week", 1, ModuleVisibility::Active).await;

    let select_uri = format!("/api/modules/{}/select", module.id);
    let release_uri = format!("/api/modules/{}/release", module.id);

    // User A takes the only seat.
    let response = app
        .clone()
        .oneshot(build_request("POST", &select_uri, Some(&token_a), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "active");

    // User B is turned away, the module is full.
    let response = app
        .clone()
        .oneshot(build_request("POST", &select_uri, Some(&token_b), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Module has no free seats");

    // A releases, B can now select.
    let response = app
        .clone()
        .oneshot(build_request("POST", &release_uri, Some(&token_a), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "released");

    let response = app
        .clone()
        .oneshot(build_request("POST", &select_uri, Some(&token_b), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A has nothing left to release.
    let response = app
        .oneshot(build_request("POST", &release_uri, Some(&token_a), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: Selecting the same module twice conflicts when seats remain.
#[tokio::test]
async fn double_select_conflicts() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Active week", 2, ModuleVisibility::Active).await;
    let uri = format!("/api/modules/{}/select", module.id);

    let response = app
        .clone()
        .oneshot(build_request("POST", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(build_request("POST", &uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "You already have an active selection for this module"
    );
}

/// Test Case: Users cannot select a module they cannot see.
#[tokio::test]
async fn selecting_hidden_module_is_not_found() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Draft week", 3, ModuleVisibility::Draft).await;

    let response = app
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: Editing flips visibility; deleting archives instead of
/// removing the row.
#[tokio::test]
async fn edit_and_archive_module() {
    let (app, db) = make_test_app().await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Draft week", 3, ModuleVisibility::Draft).await;
    let uri = format!("/api/modules/{}", module.id);

    let response = app
        .clone()
        .oneshot(build_request(
            "PUT",
            &uri,
            Some(&admin_token),
            Some(json!({ "visibility": "active", "capacity": 8 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visibility"], "active");
    assert_eq!(json["data"]["capacity"], 8);

    let response = app
        .clone()
        .oneshot(build_request("DELETE", &uri, Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visibility"], "archived");

    let response = app
        .oneshot(build_request(
            "PUT",
            "/api/modules/999",
            Some(&admin_token),
            Some(json!({ "capacity": 8 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: The PDF route requires a selection before it ever talks to
/// the drive, and reports modules without material as missing.
#[tokio::test]
async fn pdf_access_control() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;
    let pdf_uri = format!("/api/modules/{}/pdf", module.id);

    // Not selected yet.
    let response = app
        .clone()
        .oneshot(build_request("GET", &pdf_uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Selected, but the module has no drive file attached.
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(build_request("GET", &pdf_uri, Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Module has no course material");
}
