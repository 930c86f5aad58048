use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::user;
use sea_orm::EntityTrait;
use services::drive_sync::{self, SyncError};
use services::grading::{self, GradingError};
use services::reminders;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::admin::common::{DriveSyncJobResponse, ManualGradeRequest, ReminderJobResponse};
use crate::routes::submissions::common::GradeResponse;

/// POST /admin/submissions/{submission_id}/grade
///
/// Record a manual grade for a submission, replacing any automated one.
/// The score is clamped to the module's maximum and stamped with the
/// grading admin's email. Admin only.
///
/// ### Request Body
/// ```json
/// {
///   "total_points": 91.0,
///   "feedback": "Clean error handling throughout."
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "total_points": 91.0,
///     "max_points": 100,
///     "percentage": 91.0,
///     "letter_grade": "A-",
///     "graded_by": "admin@example.com"
///   },
///   "message": "Grade recorded"
/// }
/// ```
///
/// - `422 Unprocessable Entity` (validation failure)
/// - `404 Not Found` (submission missing)
pub async fn grade_submission_manually(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
    Json(req): Json<ManualGradeRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<GradeResponse>::error(error_message)),
        );
    }

    let graded_by = match user::Entity::find_by_id(claims.sub).one(app_state.db()).await {
        Ok(Some(admin)) => admin.email,
        _ => String::from("admin"),
    };

    match grading::apply_manual_grade(
        app_state.db(),
        submission_id,
        req.total_points,
        req.feedback,
        &graded_by,
    )
    .await
    {
        Ok(grade) => (
            StatusCode::OK,
            Json(ApiResponse::success(GradeResponse::from(grade), "Grade recorded")),
        ),
        Err(e @ (GradingError::SubmissionNotFound | GradingError::ModuleNotFound)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<GradeResponse>::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<GradeResponse>::error(format!(
                "Failed to record grade: {}",
                e
            ))),
        ),
    }
}

/// POST /admin/jobs/reminders
///
/// Run the weekly reminder digest immediately instead of waiting for the
/// scheduled job. Users reminded within the last six days are skipped.
/// Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "emails_sent": 12, "users_skipped": 3 },
///   "message": "Reminder run finished"
/// }
/// ```
pub async fn trigger_reminders(State(app_state): State<AppState>) -> impl IntoResponse {
    match reminders::run_weekly_reminders(app_state.db()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ReminderJobResponse {
                    emails_sent: outcome.emails_sent,
                    users_skipped: outcome.users_skipped,
                },
                "Reminder run finished",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<ReminderJobResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /admin/jobs/drive-sync
///
/// Check every module with attached course material against the drive and
/// notify selectors about new PDF revisions. Individual module failures
/// are logged and skipped. Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "checked": 9, "updated": 2, "notified": 7 },
///   "message": "Course material sync finished"
/// }
/// ```
pub async fn trigger_drive_sync(State(app_state): State<AppState>) -> impl IntoResponse {
    match drive_sync::sync_all_modules(app_state.db()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                DriveSyncJobResponse {
                    checked: outcome.checked,
                    updated: outcome.updated,
                    notified: outcome.notified,
                },
                "Course material sync finished",
            )),
        ),
        Err(e @ SyncError::Db(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<DriveSyncJobResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<DriveSyncJobResponse>::error(e.to_string())),
        ),
    }
}
