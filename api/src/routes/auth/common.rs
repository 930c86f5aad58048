//! Shared request and response types for the `/auth` route group.

use db::models::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for `POST /auth/login`.
///
/// The `id_token` is the Google ID token obtained by the frontend after the
/// user completed the Google sign-in flow.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture_url: Option<String>,
    pub role: String,
    pub reminder_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            google_id: user.google_id,
            email: user.email,
            name: user.name,
            picture_url: user.picture_url,
            role: user.role.to_string(),
            reminder_enabled: user.reminder_enabled,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Serialize, Default)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}
