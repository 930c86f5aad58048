//! # auth Routes Module
//!
//! Defines and wires up routes for the `/auth` endpoint group.
//!
//! ## Structure
//! - `post.rs`: POST handlers (Google sign-in)
//! - `get.rs`: GET handlers (current user info)
//! - `common.rs`: shared request/response types
//!
//! `auth_routes()` is nested under `/auth` in the main application. Login is
//! public; `/auth/me` authenticates through the `AuthUser` extractor.

pub mod common;
pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};
use ::common::state::AppState;

use get::get_me;
use post::login;

/// Builds the `/auth` route group.
///
/// - `POST /auth/login` → `login`
/// - `GET /auth/me` → `get_me`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_me))
}
