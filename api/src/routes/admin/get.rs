use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::state::AppState;
use db::models::submission::{self, SubmissionStatus};
use db::models::{grade, user};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::admin::common::{PaginatedSubmissionResponse, SubmissionFilterQuery};
use crate::routes::submissions::common::SubmissionResponse;

fn filter_condition(
    params: &SubmissionFilterQuery,
) -> Result<Condition, (StatusCode, Json<ApiResponse<PaginatedSubmissionResponse>>)> {
    let mut condition = Condition::all();
    if let Some(module_id) = params.module_id {
        condition = condition.add(submission::Column::ModuleId.eq(module_id));
    }
    if let Some(user_id) = params.user_id {
        condition = condition.add(submission::Column::UserId.eq(user_id));
    }
    if let Some(status) = params.status.as_deref() {
        let Ok(status) = SubmissionStatus::from_str(status) else {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::error(
                    "Unknown status, expected one of: pending, graded, regrade_requested",
                )),
            ));
        };
        condition = condition.add(submission::Column::Status.eq(status));
    }
    Ok(condition)
}

/// GET /admin/submissions
///
/// Paginated listing of submissions across all users for the admin
/// dashboard, newest first. Admin only.
///
/// ### Query Parameters
/// - `module_id` (optional): only this module's submissions.
/// - `user_id` (optional): only this user's submissions.
/// - `status` (optional): `pending`, `graded` or `regrade_requested`.
/// - `page` (optional): page number, default 1.
/// - `per_page` (optional): page size, default 20, max 100.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "submissions": [ { "id": 9, "status": "graded", "grade": { "letter_grade": "A-" } } ],
///     "page": 1,
///     "per_page": 20,
///     "total": 54
///   },
///   "message": "Submissions retrieved successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity` (unknown status filter)
pub async fn list_submissions(
    State(app_state): State<AppState>,
    Query(params): Query<SubmissionFilterQuery>,
) -> impl IntoResponse {
    let condition = match filter_condition(&params) {
        Ok(condition) => condition,
        Err(response) => return response,
    };

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let paginator = submission::Entity::find()
        .filter(condition)
        .order_by_desc(submission::Column::SubmittedAt)
        .paginate(app_state.db(), per_page);

    let total = match paginator.num_items().await {
        Ok(total) => total,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<PaginatedSubmissionResponse>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };
    let rows = match paginator.fetch_page(page - 1).await {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<PaginatedSubmissionResponse>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };

    let mut submissions = Vec::with_capacity(rows.len());
    for row in rows {
        match grade::Model::for_submission(app_state.db(), row.id).await {
            Ok(grade) => submissions.push(SubmissionResponse::with_grade(row, grade)),
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<PaginatedSubmissionResponse>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            PaginatedSubmissionResponse {
                submissions,
                page,
                per_page,
                total,
            },
            "Submissions retrieved successfully",
        )),
    )
}

/// Quotes a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// GET /admin/submissions/export
///
/// Download every submission matching the filters as CSV, including the
/// submitter's email and the stored grade. Pagination parameters are
/// ignored; the export always covers the full filtered set. Admin only.
///
/// ### Responses
///
/// - `200 OK` with `Content-Type: text/csv` and an attachment
///   `Content-Disposition`
/// - `422 Unprocessable Entity` (unknown status filter)
pub async fn export_submissions(
    State(app_state): State<AppState>,
    Query(params): Query<SubmissionFilterQuery>,
) -> Response {
    let condition = match filter_condition(&params) {
        Ok(condition) => condition,
        Err((status, _)) => {
            return (
                status,
                Json(ApiResponse::<Empty>::error(
                    "Unknown status, expected one of: pending, graded, regrade_requested",
                )),
            )
                .into_response();
        }
    };

    let rows = match submission::Entity::find()
        .filter(condition)
        .order_by_desc(submission::Column::SubmittedAt)
        .all(app_state.db())
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    let users: HashMap<i64, String> = match user::Entity::find().all(app_state.db()).await {
        Ok(users) => users.into_iter().map(|u| (u.id, u.email)).collect(),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    let mut csv = String::from(
        "id,user_email,module_id,submission_type,github_link,status,total_points,max_points,percentage,letter_grade,graded_by,submitted_at\n",
    );
    for row in rows {
        let grade = match grade::Model::for_submission(app_state.db(), row.id).await {
            Ok(grade) => grade,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
                )
                    .into_response();
            }
        };

        let user_email = users.get(&row.user_id).map(String::as_str).unwrap_or("");
        let (total_points, max_points, percentage, letter_grade, graded_by) = match &grade {
            Some(g) => (
                g.total_points.to_string(),
                g.max_points.to_string(),
                format!("{:.1}", g.percentage),
                g.letter_grade.clone(),
                g.graded_by.clone(),
            ),
            None => Default::default(),
        };

        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}\n",
            row.id,
            csv_field(user_email),
            row.module_id,
            row.submission_type,
            csv_field(&row.github_link),
            row.status,
            total_points,
            max_points,
            percentage,
            csv_field(&letter_grade),
            csv_field(&graded_by),
            row.submitted_at.to_rfc3339(),
        ));
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"submissions.csv\"".to_string(),
            ),
        ],
        csv,
    )
        .into_response()
}
