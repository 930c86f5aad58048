use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::state::AppState;
use db::models::user;
use sea_orm::EntityTrait;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::auth::common::UserResponse;

/// GET /auth/me
///
/// Return the account belonging to the presented JWT. Used by the frontend
/// to restore a session after a page reload.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1,
///     "google_id": "109876543210987654321",
///     "email": "reviewer@example.com",
///     "name": "Sam Reviewer",
///     "picture_url": null,
///     "role": "reviewer",
///     "reminder_enabled": true,
///     "created_at": "2026-07-01T09:00:00Z",
///     "updated_at": "2026-07-23T10:00:00Z"
///   },
///   "message": "User retrieved successfully"
/// }
/// ```
///
/// - `401 Unauthorized` (missing or invalid token)
/// - `404 Not Found` (account no longer exists)
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> impl IntoResponse {
    match user::Entity::find_by_id(claims.sub).one(app_state.db()).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UserResponse::from(user),
                "User retrieved successfully",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<UserResponse>::error("User not found")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UserResponse>::error(format!("Database error: {}", e))),
        ),
    }
}
