use axum::http::StatusCode;
use db::models::module::ModuleVisibility;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_module, create_user, make_test_app};

/// Test Case: The selections overview starts empty and grows as the user
/// picks modules. Each row embeds the module and an update marker.
#[tokio::test]
async fn my_selections_tracks_active_picks() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Week one", 5, ModuleVisibility::Active).await;

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/me/selections", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));

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
        .oneshot(build_request("GET", "/api/me/selections", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "active");
    assert_eq!(rows[0]["module"]["title"], "Week one");
    assert_eq!(rows[0]["material_updated"], false);
}

/// Test Case: Released selections drop out of the overview.
#[tokio::test]
async fn released_selection_leaves_the_overview() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Week one", 5, ModuleVisibility::Active).await;

    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/release", module.id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(build_request("GET", "/api/me/selections", Some(&token), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

/// Test Case: The submissions overview returns only the caller's rows,
/// newest first, with grades attached when present.
#[tokio::test]
async fn my_submissions_lists_own_rows() {
    let (app, db) = make_test_app().await;
    let (_a, token_a) = create_user(&db, "a@example.com", false).await;
    let (_b, token_b) = create_user(&db, "b@example.com", false).await;
    let module = create_module(&db, "Week one", 5, ModuleVisibility::Active).await;

    for token in [&token_a, &token_b] {
        app.clone()
            .oneshot(build_request(
                "POST",
                &format!("/api/modules/{}/select", module.id),
                Some(token),
                None,
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token_a),
            Some(json!({
                "module_id": module.id,
                "submission_type": "homework",
                "github_link": "https://github.com/sam/exercises"
            })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/me/submissions", Some(&token_a), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["submission_type"], "homework");
    assert_eq!(rows[0]["grade"], Value::Null);

    let response = app
        .oneshot(build_request("GET", "/api/me/submissions", Some(&token_b), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}

/// Test Case: Users can switch the weekly reminder email off and on.
#[tokio::test]
async fn reminder_settings_toggle() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;

    let response = app
        .clone()
        .oneshot(build_request(
            "PUT",
            "/api/me/reminders",
            Some(&token),
            Some(json!({ "enabled": false })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Reminder settings updated");
    assert_eq!(json["data"]["reminder_enabled"], false);

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["reminder_enabled"], false);

    let response = app
        .oneshot(build_request(
            "PUT",
            "/api/me/reminders",
            Some(&token),
            Some(json!({ "enabled": true })),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["reminder_enabled"], true);
}
