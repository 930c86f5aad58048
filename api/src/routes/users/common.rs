//! Shared request types for the `/users` route group.

use serde::Deserialize;
use validator::Validate;

/// Request body for `PUT /users/{user_id}/role`.
#[derive(Debug, Deserialize, Validate)]
pub struct EditRoleRequest {
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Request body for `POST /users/{user_id}/release`.
#[derive(Debug, Deserialize)]
pub struct AdminReleaseRequest {
    pub module_id: i64,
}
