use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::user;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::auth::common::UserResponse;
use crate::routes::me::common::ReminderSettingsRequest;

/// PUT /me/reminders
///
/// Turn the weekly reminder digest on or off for the caller.
///
/// ### Request Body
/// ```json
/// { "enabled": false }
/// ```
///
/// ### Responses
///
/// - `200 OK` (updated user shape)
/// ```json
/// {
///   "success": true,
///   "data": { "id": 7, "reminder_enabled": false },
///   "message": "Reminder settings updated"
/// }
/// ```
///
/// - `404 Not Found` (account no longer exists)
pub async fn update_reminder_settings(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<ReminderSettingsRequest>,
) -> impl IntoResponse {
    match user::Model::set_reminder_enabled(app_state.db(), claims.sub, req.enabled).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UserResponse::from(user),
                "Reminder settings updated",
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
