use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::user::{self, UserRole};
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::auth::common::UserResponse;
use crate::routes::users::common::EditRoleRequest;

/// PUT /users/{user_id}/role
///
/// Change an account's role. Admin only. Note that accounts listed in
/// `ADMIN_EMAILS` are promoted back to admin on their next login.
///
/// ### Request Body
/// ```json
/// { "role": "student" }
/// ```
///
/// ### Responses
///
/// - `200 OK` (updated user shape)
/// - `422 Unprocessable Entity` (unknown role)
/// ```json
/// {
///   "success": false,
///   "message": "Unknown role, expected one of: reviewer, student, admin"
/// }
/// ```
///
/// - `404 Not Found`
pub async fn set_user_role(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<EditRoleRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<UserResponse>::error(error_message)),
        );
    }

    let Ok(role) = UserRole::from_str(&req.role) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<UserResponse>::error(
                "Unknown role, expected one of: reviewer, student, admin",
            )),
        );
    };

    match user::Model::set_role(app_state.db(), user_id, role).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UserResponse::from(user),
                "Role updated successfully",
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
