use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::selection::{self, SelectionError};

use crate::response::ApiResponse;
use crate::routes::modules::common::SelectionResponse;
use crate::routes::users::common::AdminReleaseRequest;

/// POST /users/{user_id}/release
///
/// Release another user's seat on a module. Admin override for reviewers
/// who stopped responding; the freed seat becomes available immediately.
///
/// ### Request Body
/// ```json
/// { "module_id": 3 }
/// ```
///
/// ### Responses
///
/// - `200 OK` (released selection shape)
/// - `404 Not Found` (the user holds no active selection on that module)
/// ```json
/// {
///   "success": false,
///   "message": "No active selection for this module"
/// }
/// ```
pub async fn release_user_selection(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<AdminReleaseRequest>,
) -> impl IntoResponse {
    match selection::Model::release(app_state.db(), user_id, req.module_id).await {
        Ok(selection) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SelectionResponse::from(selection),
                "Selection released",
            )),
        ),
        Err(SelectionError::NotSelected) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<SelectionResponse>::error(
                "No active selection for this module",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<SelectionResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}
