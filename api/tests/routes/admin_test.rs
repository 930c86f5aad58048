use axum::http::StatusCode;
use db::models::module::ModuleVisibility;
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::app::{body_json, build_request, create_module, create_user, make_test_app};

async fn submit(
    app: &axum::Router,
    token: &str,
    module_id: i64,
    submission_type: &str,
    link: &str,
) -> i64 {
    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/modules/{module_id}/select"),
            Some(token),
            None,
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/submissions",
            Some(token),
            Some(json!({
                "module_id": module_id,
                "submission_type": submission_type,
                "github_link": link
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Test Case: The dashboard endpoints reject everyone below admin.
#[tokio::test]
async fn dashboard_requires_admin() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/admin/submissions", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(build_request("GET", "/api/admin/submissions", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test Case: The submission listing paginates and honours the module and
/// status filters. Unknown status values fail validation.
#[tokio::test]
async fn submission_listing_filters_and_paginates() {
    let (app, db) = make_test_app().await;
    let (_a, token_a) = create_user(&db, "a@example.com", false).await;
    let (_b, token_b) = create_user(&db, "b@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let first = create_module(&db, "First", 5, ModuleVisibility::Active).await;
    let second = create_module(&db, "Second", 5, ModuleVisibility::Active).await;

    submit(&app, &token_a, first.id, "homework", "https://github.com/a/first").await;
    submit(&app, &token_a, second.id, "homework", "https://github.com/a/second").await;
    let graded_id = submit(&app, &token_b, first.id, "in_class", "https://github.com/b/first").await;

    let response = app
        .clone()
        .oneshot(build_request("GET", "/api/admin/submissions", Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["per_page"], 20);
    assert_eq!(json["data"]["submissions"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(build_request(
            "GET",
            &format!("/api/admin/submissions?module_id={}", first.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);

    let response = app
        .clone()
        .oneshot(build_request(
            "GET",
            "/api/admin/submissions?per_page=2",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["submissions"].as_array().unwrap().len(), 2);

    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/admin/submissions/{graded_id}/grade"),
            Some(&admin_token),
            Some(json!({ "total_points": 80.0 })),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(build_request(
            "GET",
            "/api/admin/submissions?status=graded",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["submissions"][0]["grade"]["letter_grade"], "B-");

    let response = app
        .oneshot(build_request(
            "GET",
            "/api/admin/submissions?status=done",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Unknown status, expected one of: pending, graded, regrade_requested"
    );
}

/// Test Case: The export produces a CSV attachment with one line per
/// submission, including grade columns for graded rows.
#[tokio::test]
async fn export_returns_csv_attachment() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Exported", 5, ModuleVisibility::Active).await;

    let submission_id = submit(&app, &token, module.id, "homework", "https://github.com/a/repo").await;
    app.clone()
        .oneshot(build_request(
            "POST",
            &format!("/api/admin/submissions/{submission_id}/grade"),
            Some(&admin_token),
            Some(json!({ "total_points": 91.0 })),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(build_request(
            "GET",
            "/api/admin/submissions/export",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"submissions.csv\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,user_email,module_id,submission_type,github_link,status,total_points,max_points,percentage,letter_grade,graded_by,submitted_at"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("a@example.com"));
    assert!(row.contains("A-"));
    assert!(row.contains("admin@example.com"));
    assert_eq!(lines.next(), None);
}

/// Test Case: Manual grading validates the score and reports missing
/// submissions.
#[tokio::test]
async fn manual_grading_validates_input() {
    let (app, db) = make_test_app().await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;

    let response = app
        .clone()
        .oneshot(build_request(
            "POST",
            "/api/admin/submissions/1/grade",
            Some(&admin_token),
            Some(json!({ "total_points": -5.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/admin/submissions/999/grade",
            Some(&admin_token),
            Some(json!({ "total_points": 50.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Submission not found");
}

/// Test Case: The reminder job can be triggered from the dashboard and
/// reports its tally. A user with an unsubmitted selection gets a digest,
/// the idle admin is skipped.
#[tokio::test]
async fn reminder_job_reports_tally() {
    let (app, db) = make_test_app().await;
    let (_user, token) = create_user(&db, "a@example.com", false).await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    let module = create_module(&db, "Pending work", 5, ModuleVisibility::Active).await;

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
        .oneshot(build_request(
            "POST",
            "/api/admin/jobs/reminders",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Reminder run finished");
    assert_eq!(json["data"]["emails_sent"], 1);
    assert_eq!(json["data"]["users_skipped"], 1);
}

/// Test Case: The drive sync job runs on demand. With no attached course
/// material there is nothing to check.
#[tokio::test]
async fn drive_sync_job_with_no_material() {
    let (app, db) = make_test_app().await;
    let (_admin, admin_token) = create_user(&db, "admin@example.com", true).await;
    create_module(&db, "No material", 5, ModuleVisibility::Active).await;

    let response = app
        .oneshot(build_request(
            "POST",
            "/api/admin/jobs/drive-sync",
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Course material sync finished");
    assert_eq!(json["data"]["checked"], 0);
    assert_eq!(json["data"]["updated"], 0);
    assert_eq!(json["data"]["notified"], 0);
}
