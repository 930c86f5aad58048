use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::{grade, module, selection, submission};
use sea_orm::EntityTrait;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::me::common::MySelectionResponse;
use crate::routes::modules::common::{ModuleResponse, SelectionResponse};
use crate::routes::submissions::common::SubmissionResponse;

/// GET /me/selections
///
/// List the caller's active selections, each joined with its module.
/// `material_updated` is true when the module's PDF changed since the
/// caller was last notified, so the frontend can badge stale material.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 12,
///       "user_id": 7,
///       "module_id": 3,
///       "status": "active",
///       "notified_version": "2026-07-20T14:00:00.000Z",
///       "selected_at": "2026-07-23T10:00:00Z",
///       "released_at": null,
///       "module": { "id": 3, "title": "Ownership & Borrowing" },
///       "material_updated": false
///     }
///   ],
///   "message": "Selections retrieved successfully"
/// }
/// ```
pub async fn my_selections(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    let selections = match selection::Model::active_for_user(app_state.db(), claims.sub).await {
        Ok(selections) => selections,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<MySelectionResponse>>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };

    let mut data = Vec::with_capacity(selections.len());
    for row in selections {
        let module = match module::Entity::find_by_id(row.module_id).one(app_state.db()).await {
            Ok(module) => module,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<Vec<MySelectionResponse>>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                );
            }
        };
        let material_updated = module
            .as_ref()
            .and_then(|m| m.drive_version.as_deref())
            .is_some_and(|version| row.notified_version.as_deref() != Some(version));
        data.push(MySelectionResponse {
            selection: SelectionResponse::from(row),
            module: module.map(ModuleResponse::from),
            material_updated,
        });
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(data, "Selections retrieved successfully")),
    )
}

/// GET /me/submissions
///
/// List every submission the caller has made, newest first, each with its
/// grade when one exists.
///
/// ### Responses
///
/// - `200 OK` (array of submission shapes)
pub async fn my_submissions(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    let submissions = match submission::Model::for_user(app_state.db(), claims.sub).await {
        Ok(submissions) => submissions,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<SubmissionResponse>>::error(format!(
                    "Database error: {}",
                    e
                ))),
            );
        }
    };

    let mut data = Vec::with_capacity(submissions.len());
    for row in submissions {
        match grade::Model::for_submission(app_state.db(), row.id).await {
            Ok(grade) => data.push(SubmissionResponse::with_grade(row, grade)),
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<Vec<SubmissionResponse>>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(data, "Submissions retrieved successfully")),
    )
}
