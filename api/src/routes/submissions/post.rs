use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::notification::{self, NotificationKind};
use db::models::submission::{self, SubmissionError};
use db::models::{module, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use services::email::EmailService;
use services::grading::{self, AUTO_GRADER};
use services::slack;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::submissions::common::{SubmissionRequest, SubmissionResponse};

/// POST /submissions
///
/// Hand in a GitHub repository link for a selected module. Each
/// (module, submission type) slot holds exactly one submission per user;
/// a second hand-in on the same slot is rejected. When the module has
/// automated grading enabled, an evaluation run starts in the background
/// right after the submission is stored, and admins are notified.
///
/// ### Request Body
/// ```json
/// {
///   "module_id": 3,
///   "submission_type": "homework",
///   "github_link": "https://github.com/sam/ownership-exercises",
///   "comments": "Bonus exercise included"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 9,
///     "user_id": 7,
///     "module_id": 3,
///     "submission_type": "homework",
///     "github_link": "https://github.com/sam/ownership-exercises",
///     "comments": "Bonus exercise included",
///     "status": "pending",
///     "grading_attempts": 0,
///     "last_grading_error": null,
///     "submitted_at": "2026-07-23T10:00:00Z",
///     "grade": null
///   },
///   "message": "Submission received"
/// }
/// ```
///
/// - `422 Unprocessable Entity` (validation failure)
/// ```json
/// {
///   "success": false,
///   "message": "Link must be a GitHub repository URL like https://github.com/user/repo"
/// }
/// ```
///
/// - `404 Not Found` (no active selection on the module)
/// - `409 Conflict` (slot already filled)
/// ```json
/// {
///   "success": false,
///   "message": "A submission of this type already exists for this module"
/// }
/// ```
pub async fn create_submission(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<SubmissionRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<SubmissionResponse>::error(error_message)),
        );
    }

    let submission = match submission::Model::submit(
        app_state.db(),
        claims.sub,
        req.module_id,
        req.submission_type,
        &req.github_link,
        req.comments.as_deref(),
    )
    .await
    {
        Ok(submission) => submission,
        Err(e @ SubmissionError::NotSelected) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
            );
        }
        Err(e @ SubmissionError::DuplicateSubmission) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SubmissionResponse>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };

    tokio::spawn(follow_up_on_submission(
        app_state.db_clone(),
        submission.clone(),
    ));

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            SubmissionResponse::from(submission),
            "Submission received",
        )),
    )
}

/// Background work after a submission is stored: admin notifications and,
/// when the module grades automatically, the evaluation run itself.
async fn follow_up_on_submission(db: DatabaseConnection, submission: submission::Model) {
    let module = match module::Entity::find_by_id(submission.module_id).one(&db).await {
        Ok(Some(module)) => module,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("submission follow-up aborted, module lookup failed: {}", e);
            return;
        }
    };
    let submitter_email = match user::Entity::find_by_id(submission.user_id).one(&db).await {
        Ok(Some(user)) => user.email,
        _ => String::from("unknown"),
    };

    for admin_email in common::config::admin_emails() {
        if let Err(e) = EmailService::send_submission_received(
            &admin_email,
            &module.title,
            &submitter_email,
            &submission.github_link,
        )
        .await
        {
            tracing::warn!("submission email to {} failed: {}", admin_email, e);
        }
        notification::Model::record(
            &db,
            &admin_email,
            NotificationKind::SubmissionReceived,
            Some(module.id),
            Some(&submission.github_link),
        )
        .await;
    }
    slack::post_message(&format!(
        "New {} submission for \"{}\" from {}",
        submission.submission_type, module.title, submitter_email
    ))
    .await;

    if module.grading_enabled {
        if let Err(e) = grading::grade_submission(&db, submission.id, AUTO_GRADER).await {
            tracing::warn!("automated grading of submission {} failed: {}", submission.id, e);
        }
    }
}

/// POST /submissions/{submission_id}/regrade
///
/// Throw away the stored grade and queue the submission for another
/// evaluation. Only the submitting user or an admin may request this, and
/// only graded submissions qualify. When the module grades automatically
/// the new run starts immediately in the background.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 9,
///     "status": "regrade_requested",
///     "grade": null
///   },
///   "message": "Regrade requested"
/// }
/// ```
///
/// - `403 Forbidden` (someone else's submission)
/// - `404 Not Found`
/// - `409 Conflict` (submission has no grade to discard)
/// ```json
/// {
///   "success": false,
///   "message": "Only graded submissions can be regraded"
/// }
/// ```
pub async fn request_regrade(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
) -> impl IntoResponse {
    let existing = match submission::Entity::find_by_id(submission_id)
        .one(app_state.db())
        .await
    {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<SubmissionResponse>::error("Submission not found")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SubmissionResponse>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };

    if existing.user_id != claims.sub && !claims.admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<SubmissionResponse>::error(
                "You do not have permission to modify this submission",
            )),
        );
    }

    match submission::Model::request_regrade(app_state.db(), submission_id).await {
        Ok(submission) => {
            tokio::spawn(regrade_in_background(
                app_state.db_clone(),
                submission.clone(),
            ));
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    SubmissionResponse::from(submission),
                    "Regrade requested",
                )),
            )
        }
        Err(e @ SubmissionError::InvalidState(_)) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
        ),
        Err(e @ SubmissionError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<SubmissionResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

async fn regrade_in_background(db: DatabaseConnection, submission: submission::Model) {
    let grading_enabled = match module::Entity::find_by_id(submission.module_id).one(&db).await {
        Ok(Some(module)) => module.grading_enabled,
        _ => false,
    };
    if grading_enabled {
        if let Err(e) = grading::grade_submission(&db, submission.id, AUTO_GRADER).await {
            tracing::warn!("regrade of submission {} failed: {}", submission.id, e);
        }
    }
}
