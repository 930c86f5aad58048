use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::module::{self, ModuleError};
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::modules::common::{AdminModuleResponse, EditModuleRequest};

/// PUT /modules/{module_id}
///
/// Update a module. Only the fields present in the body change; visibility
/// transitions (`draft` → `pilot_review` → `active` → `archived`) happen
/// through this endpoint as well. Replacing `drive_file_id` clears the
/// stored drive version so the next sync treats the new document as fresh.
/// Admin only.
///
/// ### Request Body
/// ```json
/// {
///   "capacity": 8,
///   "visibility": "active"
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK` (updated module, admin shape)
/// - `422 Unprocessable Entity` (validation failure)
/// - `404 Not Found`
/// ```json
/// {
///   "success": false,
///   "message": "Module not found"
/// }
/// ```
pub async fn edit_module(
    State(app_state): State<AppState>,
    Path(module_id): Path<i64>,
    Json(req): Json<EditModuleRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<AdminModuleResponse>::error(error_message)),
        );
    }

    match module::Model::edit(app_state.db(), module_id, req.into_changes()).await {
        Ok(module) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                AdminModuleResponse::from(module),
                "Module updated successfully",
            )),
        ),
        Err(e @ ModuleError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<AdminModuleResponse>::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<AdminModuleResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}
