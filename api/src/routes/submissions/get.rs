use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::{grade, submission};
use sea_orm::EntityTrait;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::submissions::common::{GradeResponse, SubmissionResponse};

/// GET /submissions/{submission_id}
///
/// Fetch one submission with its grade, if graded. Only the submitting
/// user or an admin may view it.
///
/// ### Responses
///
/// - `200 OK` (submission shape, `grade` populated once graded)
/// - `403 Forbidden` (someone else's submission)
/// - `404 Not Found`
pub async fn get_submission(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
) -> impl IntoResponse {
    let submission = match submission::Entity::find_by_id(submission_id)
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

    if submission.user_id != claims.sub && !claims.admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<SubmissionResponse>::error(
                "You do not have permission to view this submission",
            )),
        );
    }

    match grade::Model::for_submission(app_state.db(), submission.id).await {
        Ok(grade) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SubmissionResponse::with_grade(submission, grade),
                "Submission retrieved successfully",
            )),
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

/// GET /submissions/{submission_id}/grade
///
/// Fetch just the grade for a submission. Only the submitting user or an
/// admin may view it.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "total_points": 87.5,
///     "max_points": 100,
///     "percentage": 87.5,
///     "letter_grade": "B+",
///     "score_breakdown": { "readme": 10, "code_structure": 20 },
///     "feedback": "Solid work",
///     "strengths": ["clear module layout"],
///     "improvements": ["add integration tests"],
///     "graded_by": "auto",
///     "graded_at": "2026-07-23T10:05:00Z"
///   },
///   "message": "Grade retrieved successfully"
/// }
/// ```
///
/// - `403 Forbidden` (someone else's submission)
/// - `404 Not Found` (submission missing, or not graded yet)
pub async fn get_submission_grade(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(submission_id): Path<i64>,
) -> impl IntoResponse {
    let submission = match submission::Entity::find_by_id(submission_id)
        .one(app_state.db())
        .await
    {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<GradeResponse>::error("Submission not found")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<GradeResponse>::error(format!("Database error: {}", e))),
            );
        }
    };

    if submission.user_id != claims.sub && !claims.admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<GradeResponse>::error(
                "You do not have permission to view this submission",
            )),
        );
    }

    match grade::Model::for_submission(app_state.db(), submission.id).await {
        Ok(Some(grade)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                GradeResponse::from(grade),
                "Grade retrieved successfully",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<GradeResponse>::error(
                "No grade for this submission yet",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<GradeResponse>::error(format!("Database error: {}", e))),
        ),
    }
}
