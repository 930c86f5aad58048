//! # users Routes Module
//!
//! Defines and wires up routes for the `/users` endpoint group. The whole
//! group is admin-only (enforced where the group is nested).
//!
//! ## Structure
//! - `get.rs`: account listing
//! - `put.rs`: role changes
//! - `post.rs`: admin seat release
//! - `common.rs`: shared request types

pub mod common;
pub mod get;
pub mod post;
pub mod put;

use ::common::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

use get::list_users;
use post::release_user_selection;
use put::set_user_role;

/// Builds the `/users` route group.
///
/// - `GET /users` → `list_users`
/// - `PUT /users/{user_id}/role` → `set_user_role`
/// - `POST /users/{user_id}/release` → `release_user_selection`
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{user_id}/role", put(set_user_role))
        .route("/{user_id}/release", post(release_user_selection))
}
