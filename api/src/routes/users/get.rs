use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::state::AppState;
use db::models::user;

use crate::response::ApiResponse;
use crate::routes::auth::common::UserResponse;

/// GET /users
///
/// List every account, newest first. Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 7,
///       "google_id": "109876543210987654321",
///       "email": "reviewer@example.com",
///       "name": "Sam Reviewer",
///       "role": "reviewer",
///       "reminder_enabled": true
///     }
///   ],
///   "message": "Users retrieved successfully"
/// }
/// ```
///
/// - `403 Forbidden` (non-admin)
pub async fn list_users(State(app_state): State<AppState>) -> impl IntoResponse {
    match user::Model::list_all(app_state.db()).await {
        Ok(users) => {
            let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Users retrieved successfully")),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<UserResponse>>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}
