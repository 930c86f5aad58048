//! HTTP route entry point for `/api/...`.
//!
//! This module defines all HTTP entry points under the `/api` namespace.
//! Routes are organized by domain (e.g., authentication, modules,
//! submissions, health), each protected via appropriate access control
//! middleware.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Google sign-in and current-user info (public login, token-guarded `/me`)
//! - `/modules` → Module browsing, selection and material access (authenticated users; admin for management)
//! - `/submissions` → Submission hand-in, grade view and regrade (authenticated users)
//! - `/me` → The caller's own submissions, selections and settings
//! - `/users` → User management (admin-only)
//! - `/admin` → Submission oversight, manual grading, exports and job triggers (admin-only)

use crate::auth::guards::{allow_admin, allow_authenticated};
use crate::routes::{
    admin::admin_routes, auth::auth_routes, health::health_routes, me::me_routes,
    modules::modules_routes, submissions::submissions_routes, users::users_routes,
};
use axum::{Router, middleware::from_fn};
use common::state::AppState;

pub mod admin;
pub mod auth;
pub mod health;
pub mod me;
pub mod modules;
pub mod submissions;
pub mod users;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router is ready to nest under `/api` and carries no
/// remaining state parameter; `AppState` is applied here so `main` only
/// deals with top-level middleware.
///
/// # Route Structure:
/// - `/health` → Health check endpoint (no authentication required).
/// - `/auth` → Login via Google ID token; `/auth/me` requires a valid JWT.
/// - `/modules` → Browsing, seat selection and PDFs (requires authentication; management routes additionally require admin).
/// - `/submissions` → Hand-ins and regrades (requires authentication).
/// - `/me` → User-specific listings and settings (requires authentication).
/// - `/users` → User administration (restricted to admins via `allow_admin` middleware).
/// - `/admin` → Grading oversight and scheduled-job triggers (admin only).
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/modules",
            modules_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/submissions",
            submissions_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/me", me_routes().route_layer(from_fn(allow_authenticated)))
        .nest("/users", users_routes().route_layer(from_fn(allow_admin)))
        .nest("/admin", admin_routes().route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
