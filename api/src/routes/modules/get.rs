use axum::{
    Json,
    body::Body,
    extract::{Extension, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::state::AppState;
use db::models::{module, selection};
use sea_orm::EntityTrait;
use services::drive::{self, DriveError};

use crate::auth::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::modules::common::{AdminModuleResponse, ModuleResponse};

/// GET /modules
///
/// List course modules. Regular users only see modules in a visible state
/// (`pilot_review` or `active`); admins get every module including drafts
/// and archived ones, with drive and grading details attached.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 3,
///       "title": "Ownership & Borrowing",
///       "week_number": 3,
///       "description": "Core language week",
///       "instructions": null,
///       "capacity": 5,
///       "occupancy": 2,
///       "seats_left": 3,
///       "visibility": "active",
///       "has_material": true,
///       "grading_enabled": true,
///       "max_points": 100,
///       "created_at": "2026-07-01T09:00:00Z",
///       "updated_at": "2026-07-20T14:00:00Z"
///     }
///   ],
///   "message": "Modules retrieved successfully"
/// }
/// ```
///
/// - `401 Unauthorized` (missing or invalid token)
pub async fn list_modules(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    if claims.admin {
        match module::Model::list_all(app_state.db()).await {
            Ok(modules) => {
                let data: Vec<AdminModuleResponse> =
                    modules.into_iter().map(AdminModuleResponse::from).collect();
                (
                    StatusCode::OK,
                    Json(ApiResponse::success(data, "Modules retrieved successfully")),
                )
                    .into_response()
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response(),
        }
    } else {
        match module::Model::list_visible(app_state.db()).await {
            Ok(modules) => {
                let data: Vec<ModuleResponse> =
                    modules.into_iter().map(ModuleResponse::from).collect();
                (
                    StatusCode::OK,
                    Json(ApiResponse::success(data, "Modules retrieved successfully")),
                )
                    .into_response()
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response(),
        }
    }
}

/// GET /modules/{module_id}
///
/// Fetch a single module. Modules that are hidden from regular users
/// (draft or archived) return `404` for non-admins, exactly as if they did
/// not exist.
///
/// ### Responses
///
/// - `200 OK` (same shape as the listing entry)
/// - `404 Not Found`
/// ```json
/// {
///   "success": false,
///   "message": "Module not found"
/// }
/// ```
pub async fn get_module(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(module_id): Path<i64>,
) -> Response {
    let module = match module::Entity::find_by_id(module_id).one(app_state.db()).await {
        Ok(Some(module)) => module,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Module not found")),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    if !claims.admin {
        if !module.is_visible() {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Module not found")),
            )
                .into_response();
        }
        return (
            StatusCode::OK,
            Json(ApiResponse::success(
                ModuleResponse::from(module),
                "Module retrieved successfully",
            )),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            AdminModuleResponse::from(module),
            "Module retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /modules/{module_id}/pdf
///
/// Stream the module's course material PDF from the drive. Regular users
/// must hold an active selection on the module; admins can fetch any
/// module's material. The body is streamed straight through so large PDFs
/// never sit in API memory.
///
/// ### Responses
///
/// - `200 OK` with `Content-Type: application/pdf` and an inline
///   `Content-Disposition`
/// - `403 Forbidden` (no active selection on this module)
/// - `404 Not Found` (module hidden/missing, no material attached, or the
///   drive file is gone)
/// - `502 Bad Gateway` (drive unreachable or returned an error)
pub async fn get_module_pdf(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(module_id): Path<i64>,
) -> Response {
    let module = match module::Entity::find_by_id(module_id).one(app_state.db()).await {
        Ok(Some(module)) => module,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Module not found")),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    if !claims.admin {
        if !module.is_visible() {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Module not found")),
            )
                .into_response();
        }
        match selection::Model::find_active(app_state.db(), claims.sub, module_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(ApiResponse::<Empty>::error(
                        "Select this module to view its material",
                    )),
                )
                    .into_response();
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<Empty>::error(format!("Database error: {}", e))),
                )
                    .into_response();
            }
        }
    }

    let Some(file_id) = module.drive_file_id.as_deref() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("Module has no course material")),
        )
            .into_response();
    };

    match drive::download(file_id).await {
        Ok(response) => {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("application/pdf")
                .to_string();
            let disposition = format!("inline; filename=\"module-{}.pdf\"", module.id);
            let body = Body::from_stream(response.bytes_stream());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(DriveError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("Drive file not found")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<Empty>::error(format!(
                "Course material is currently unavailable: {}",
                e
            ))),
        )
            .into_response(),
    }
}
