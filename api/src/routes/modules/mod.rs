//! # modules Routes Module
//!
//! Defines and wires up routes for the `/modules` endpoint group.
//!
//! ## Structure
//! - `get.rs`: listing, detail and PDF download
//! - `post.rs`: create, select, release, drive check and grading runs
//! - `put.rs`: module updates
//! - `delete.rs`: archiving
//! - `common.rs`: shared request/response types
//!
//! The whole group requires authentication (applied where the group is
//! nested); management routes additionally pass through `allow_admin`.

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use ::common::state::AppState;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};

use crate::auth::guards::allow_admin;
use delete::delete_module;
use get::{get_module, get_module_pdf, list_modules};
use post::{check_update, create_module, grade_all_module, release_module, select_module};
use put::edit_module;

/// Builds the `/modules` route group.
///
/// User-facing routes:
/// - `GET /modules` → `list_modules`
/// - `GET /modules/{module_id}` → `get_module`
/// - `GET /modules/{module_id}/pdf` → `get_module_pdf`
/// - `POST /modules/{module_id}/select` → `select_module`
/// - `POST /modules/{module_id}/release` → `release_module`
///
/// Admin-only routes:
/// - `POST /modules` → `create_module`
/// - `PUT /modules/{module_id}` → `edit_module`
/// - `DELETE /modules/{module_id}` → `delete_module`
/// - `POST /modules/{module_id}/check-update` → `check_update`
/// - `POST /modules/{module_id}/grade-all` → `grade_all_module`
pub fn modules_routes() -> Router<AppState> {
    let user_routes = Router::new()
        .route("/", get(list_modules))
        .route("/{module_id}", get(get_module))
        .route("/{module_id}/pdf", get(get_module_pdf))
        .route("/{module_id}/select", post(select_module))
        .route("/{module_id}/release", post(release_module));

    let admin_routes = Router::new()
        .route("/", post(create_module))
        .route("/{module_id}", put(edit_module).delete(delete_module))
        .route("/{module_id}/check-update", post(check_update))
        .route("/{module_id}/grade-all", post(grade_all_module))
        .route_layer(from_fn(allow_admin));

    user_routes.merge(admin_routes)
}
