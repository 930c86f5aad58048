use axum::http::StatusCode;
use db::models::module::ModuleVisibility;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_module, create_user, make_test_app};

fn submission_body(module_id: i64, submission_type: &str, link: &str) -> Value {
    json!({
        "module_id": module_id,
        "submission_type": submission_type,
        "github_link": link
    })
}

/// Test Case: Handing in without holding a seat on the module fails.
#[tokio::test]
async fn submit_requires_selection() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You must select this module before submitting");
}

/// Test Case: Only GitHub repository URLs pass validation.
#[tokio::test]
async fn submit_rejects_non_github_links() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "homework",
                "https://gitlab.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

/// Test Case: One live submission per (module, type) slot. A second
/// homework hand-in conflicts, while the in-class slot stays open.
#[tokio::test]
async fn duplicate_submission_per_slot_conflicts() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

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
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["grade"], Value::Null);

    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises-v2",
            )),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "A submission of this type already exists for this module"
    );

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "in_class",
                "https://github.com/sam/in-class",
            )),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Test Case: Submissions are only visible to their owner and admins.
#[tokio::test]
async fn submission_access_is_owner_or_admin() {
    let (app, db) = make_test_app().await;
    let (_a, token_a) = create_user(&db, "a@example.com", false).await;
    let (_b, token_b) = create_user(&db, "b@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token_a),
            None,
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token_a),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/submissions/{submission_id}");

    let response = app
        .clone()
        .oneshot(build_request("GET", &uri, Some(&token_b), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(build_request("GET", &uri, Some(&token_a), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(build_request("GET", &uri, Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test Case: The grade route reports missing grades as 404 and regrades
/// are only possible once a grade exists. A manual grade closes the loop:
/// grade, fetch, regrade, and the grade is gone again.
#[tokio::test]
async fn grade_and_regrade_roundtrip() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

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
            "/api/submissions",
            Some(&token),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // No grade yet.
    let response = app
        .clone()
        .oneshot(build_request(
            "GET",
            &format!("/api/submissions/{submission_id}/grade"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Regrading an ungraded submission conflicts.
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/submissions/{submission_id}/regrade"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Only graded submissions can be regraded");

    // An admin records a manual grade.
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/admin/submissions/{submission_id}/grade"),
            Some(&admin_token),
            Some(json!({ "total_points": 91.0, "feedback": "Nice work" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["letter_grade"], "A-");
    assert_eq!(json["data"]["graded_by"], "admin@example.com");

    // The owner sees the grade now.
    let response = app
        .clone()
        .oneshot(build_request(
            "GET",
            &format!("/api/submissions/{submission_id}/grade"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["percentage"], 91.0);

    // Regrade throws the grade away and queues the submission again.
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/submissions/{submission_id}/regrade"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "regrade_requested");

    let response = app
        .oneshot(build_request(
            "GET",
            &format!("/api/submissions/{submission_id}/grade"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test Case: Only the owner or an admin may request a regrade.
#[tokio::test]
async fn regrade_by_stranger_is_forbidden() {
    let (app, db) = make_test_app().await;
    let (_a, token_a) = create_user(&db, "a@example.com", false).await;
    let (_b, token_b) = create_user(&db, "b@example.com", false).await;
    let module = create_module(&db, "Active week", 3, ModuleVisibility::Active).await;

    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{}/select", module.id),
            Some(&token_a),
            None,
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(&token_a),
            Some(submission_body(
                module.id,
                "homework",
                "https://github.com/sam/exercises",
            )),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .oneshot(build_request(
            "POST",
            &format!("/api/submissions/{submission_id}/regrade"),
            Some(&token_b),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
