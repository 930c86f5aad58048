use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::state::AppState;
use db::models::module::{self, ModuleError};

use crate::response::ApiResponse;
use crate::routes::modules::common::AdminModuleResponse;

/// DELETE /modules/{module_id}
///
/// Archive a module. Archiving is the portal's delete: the module vanishes
/// from user-facing listings but its selections, submissions and grades
/// stay intact for reporting. Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "id": 3, "visibility": "archived" },
///   "message": "Module archived"
/// }
/// ```
///
/// - `404 Not Found`
/// ```json
/// {
///   "success": false,
///   "message": "Module not found"
/// }
/// ```
pub async fn delete_module(
    State(app_state): State<AppState>,
    Path(module_id): Path<i64>,
) -> impl IntoResponse {
    match module::Model::archive(app_state.db(), module_id).await {
        Ok(module) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                AdminModuleResponse::from(module),
                "Module archived",
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
