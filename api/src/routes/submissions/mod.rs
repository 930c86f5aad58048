//! # submissions Routes Module
//!
//! Defines and wires up routes for the `/submissions` endpoint group.
//!
//! ## Structure
//! - `post.rs`: hand-in and regrade requests
//! - `get.rs`: submission and grade retrieval
//! - `common.rs`: shared request/response types
//!
//! All routes require authentication; ownership checks happen per handler
//! so admins can view and regrade any submission.

pub mod common;
pub mod get;
pub mod post;

use ::common::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

use get::{get_submission, get_submission_grade};
use post::{create_submission, request_regrade};

/// Builds the `/submissions` route group.
///
/// - `POST /submissions` → `create_submission`
/// - `GET /submissions/{submission_id}` → `get_submission`
/// - `GET /submissions/{submission_id}/grade` → `get_submission_grade`
/// - `POST /submissions/{submission_id}/regrade` → `request_regrade`
pub fn submissions_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_submission))
        .route("/{submission_id}", get(get_submission))
        .route("/{submission_id}/grade", get(get_submission_grade))
        .route("/{submission_id}/regrade", post(request_regrade))
}
