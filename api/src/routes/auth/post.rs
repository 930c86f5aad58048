use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::format_validation_errors;
use common::state::AppState;
use db::models::user;
use services::oauth::{self, OAuthError};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use crate::routes::auth::common::{LoginRequest, LoginResponse, UserResponse};

/// POST /auth/login
///
/// Verify a Google ID token and issue an API JWT. The account is created on
/// first login; on later logins the profile fields (name, picture) are kept
/// in sync with Google. Accounts whose email is listed in `ADMIN_EMAILS` are
/// promoted to admin.
///
/// ### Request Body
/// ```json
/// {
///   "id_token": "eyJhbGciOiJSUzI1NiIs..."
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
///     "token": "jwt_token_here",
///     "expires_at": "2026-07-23T11:00:00Z",
///     "user": {
///       "id": 1,
///       "google_id": "109876543210987654321",
///       "email": "reviewer@example.com",
///       "name": "Sam Reviewer",
///       "picture_url": null,
///       "role": "reviewer",
///       "reminder_enabled": true,
///       "created_at": "2026-07-01T09:00:00Z",
///       "updated_at": "2026-07-23T10:00:00Z"
///     }
///   },
///   "message": "Login successful"
/// }
/// ```
///
/// - `422 Unprocessable Entity` (validation failure)
/// ```json
/// {
///   "success": false,
///   "message": "id_token is required"
/// }
/// ```
///
/// - `401 Unauthorized` (token rejected by Google, wrong audience, or unverified email)
/// ```json
/// {
///   "success": false,
///   "message": "Google rejected the ID token"
/// }
/// ```
///
/// - `502 Bad Gateway` (token verification service unreachable)
pub async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<LoginResponse>::error(error_message)),
        );
    }

    let identity = match oauth::verify_id_token(&req.id_token).await {
        Ok(identity) => identity,
        Err(e) => {
            let status = match e {
                OAuthError::Request(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNAUTHORIZED,
            };
            return (status, Json(ApiResponse::<LoginResponse>::error(e.to_string())));
        }
    };

    let is_admin_email = common::config::is_admin_email(&identity.email);
    match user::Model::upsert_from_identity(
        app_state.db(),
        &identity.google_id,
        &identity.email,
        &identity.name,
        identity.picture.as_deref(),
        is_admin_email,
    )
    .await
    {
        Ok(user) => {
            let (token, expires_at) = generate_jwt(user.id, user.is_admin());
            let response = LoginResponse {
                token,
                expires_at,
                user: UserResponse::from(user),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(response, "Login successful")),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<LoginResponse>::error(format!("Database error: {}", e))),
        ),
    }
}
