use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::format_validation_errors;
use common::state::AppState;
use db::models::module;
use db::models::selection::{self, SelectionError};
use sea_orm::EntityTrait;
use services::drive::DriveError;
use services::drive_sync::{self, SyncError};
use services::grading::{self, GradingError};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::modules::common::{
    AdminModuleResponse, CheckUpdateResponse, CreateModuleRequest, GradeAllResponse,
    SelectionResponse,
};

/// POST /modules
///
/// Create a new module. Admin only. New modules start in the `draft`
/// state with zero occupancy; flip visibility through `PUT /modules/{id}`
/// once the material is ready.
///
/// ### Request Body
/// ```json
/// {
///   "title": "Ownership & Borrowing",
///   "week_number": 3,
///   "description": "Core language week",
///   "capacity": 5,
///   "drive_file_id": "1AbCdEfGhIjKlMnOp",
///   "grading_enabled": true,
///   "grading_script_url": "https://example.com/evaluate.py",
///   "max_points": 100
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 3,
///     "title": "Ownership & Borrowing",
///     "week_number": 3,
///     "visibility": "draft",
///     "occupancy": 0,
///     "seats_left": 5,
///     "drive_file_id": "1AbCdEfGhIjKlMnOp",
///     "drive_version": null
///   },
///   "message": "Module created successfully"
/// }
/// ```
///
/// - `422 Unprocessable Entity` (validation failure)
/// ```json
/// {
///   "success": false,
///   "message": "Week number must be between 1 and 52"
/// }
/// ```
///
/// - `403 Forbidden` (non-admin)
pub async fn create_module(
    State(app_state): State<AppState>,
    Json(req): Json<CreateModuleRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<AdminModuleResponse>::error(error_message)),
        );
    }

    match module::Model::create(
        app_state.db(),
        &req.title,
        req.week_number,
        req.description.as_deref(),
        req.instructions.as_deref(),
        req.capacity,
        req.drive_file_id.as_deref(),
        req.grading_enabled,
        req.grading_script_url.as_deref(),
        req.max_points,
    )
    .await
    {
        Ok(module) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                AdminModuleResponse::from(module),
                "Module created successfully",
            )),
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

/// POST /modules/{module_id}/select
///
/// Claim a seat on a module. The seat count is enforced atomically, so
/// two users racing for the last seat cannot both win it. Hidden modules
/// behave as missing for non-admins.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 12,
///     "user_id": 7,
///     "module_id": 3,
///     "status": "active",
///     "notified_version": "2026-07-20T14:00:00.000Z",
///     "selected_at": "2026-07-23T10:00:00Z",
///     "released_at": null
///   },
///   "message": "Module selected successfully"
/// }
/// ```
///
/// - `404 Not Found` (module missing or hidden)
/// - `409 Conflict` (module full, or the user already holds a seat)
/// ```json
/// {
///   "success": false,
///   "message": "Module has no free seats"
/// }
/// ```
pub async fn select_module(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(module_id): Path<i64>,
) -> impl IntoResponse {
    if !claims.admin {
        match module::Entity::find_by_id(module_id).one(app_state.db()).await {
            Ok(Some(module)) if module.is_visible() => {}
            Ok(_) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<SelectionResponse>::error("Module not found")),
                );
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<SelectionResponse>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                );
            }
        }
    }

    match selection::Model::select(app_state.db(), claims.sub, module_id).await {
        Ok(selection) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SelectionResponse::from(selection),
                "Module selected successfully",
            )),
        ),
        Err(e @ SelectionError::ModuleNotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<SelectionResponse>::error(e.to_string())),
        ),
        Err(e @ (SelectionError::CapacityExceeded | SelectionError::AlreadySelected)) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<SelectionResponse>::error(e.to_string())),
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

/// POST /modules/{module_id}/release
///
/// Give back the caller's seat on a module. The selection row is kept as
/// history and the freed seat becomes available immediately.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 12,
///     "user_id": 7,
///     "module_id": 3,
///     "status": "released",
///     "selected_at": "2026-07-23T10:00:00Z",
///     "released_at": "2026-07-24T08:00:00Z"
///   },
///   "message": "Selection released"
/// }
/// ```
///
/// - `404 Not Found` (no active selection on this module)
/// ```json
/// {
///   "success": false,
///   "message": "No active selection for this module"
/// }
/// ```
pub async fn release_module(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(module_id): Path<i64>,
) -> impl IntoResponse {
    match selection::Model::release(app_state.db(), claims.sub, module_id).await {
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

/// POST /modules/{module_id}/check-update
///
/// Compare the module's stored drive version token against the drive's
/// current `modifiedTime` and, when the material changed, record the new
/// token and notify every active selector who has not seen it. Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "module_id": 3,
///     "version": "2026-07-22T09:30:00.000Z",
///     "updated": true,
///     "notified": 4
///   },
///   "message": "Course material check finished"
/// }
/// ```
///
/// - `404 Not Found` (module missing, or the drive file is gone)
/// - `409 Conflict` (module has no drive file attached)
/// - `502 Bad Gateway` (drive unreachable)
pub async fn check_update(
    State(app_state): State<AppState>,
    Path(module_id): Path<i64>,
) -> impl IntoResponse {
    match drive_sync::check_module_update(app_state.db(), module_id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CheckUpdateResponse::from(result),
                "Course material check finished",
            )),
        ),
        Err(e @ SyncError::ModuleNotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<CheckUpdateResponse>::error(e.to_string())),
        ),
        Err(SyncError::NoDriveFile) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<CheckUpdateResponse>::error(
                "Module has no course material",
            )),
        ),
        Err(SyncError::Drive(DriveError::NotFound)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<CheckUpdateResponse>::error("Drive file not found")),
        ),
        Err(e @ SyncError::Drive(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<CheckUpdateResponse>::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<CheckUpdateResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /modules/{module_id}/grade-all
///
/// Run the automated evaluation for every submission on the module that is
/// still waiting for a grade. Failures on individual submissions are
/// counted, not fatal. Admin only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "graded": 6, "failed": 1 },
///   "message": "Grading run finished"
/// }
/// ```
///
/// - `404 Not Found` (module missing)
pub async fn grade_all_module(
    State(app_state): State<AppState>,
    Path(module_id): Path<i64>,
) -> impl IntoResponse {
    match grading::grade_all(app_state.db(), module_id).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                GradeAllResponse::from(outcome),
                "Grading run finished",
            )),
        ),
        Err(e @ GradingError::ModuleNotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<GradeAllResponse>::error(e.to_string())),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<GradeAllResponse>::error(format!(
                "Grading run failed: {}",
                e
            ))),
        ),
    }
}
