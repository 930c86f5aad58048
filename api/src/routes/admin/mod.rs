//! # admin Routes Module
//!
//! Defines and wires up routes for the `/admin` endpoint group: grading
//! oversight and manual triggers for the scheduled jobs. The whole group
//! is admin-only (enforced where the group is nested).
//!
//! ## Structure
//! - `get.rs`: cross-user submission listing and CSV export
//! - `post.rs`: manual grading and job triggers
//! - `common.rs`: shared request/response types

pub mod common;
pub mod get;
pub mod post;

use ::common::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

use get::{export_submissions, list_submissions};
use post::{grade_submission_manually, trigger_drive_sync, trigger_reminders};

/// Builds the `/admin` route group.
///
/// - `GET /admin/submissions` → `list_submissions`
/// - `GET /admin/submissions/export` → `export_submissions`
/// - `POST /admin/submissions/{submission_id}/grade` → `grade_submission_manually`
/// - `POST /admin/jobs/reminders` → `trigger_reminders`
/// - `POST /admin/jobs/drive-sync` → `trigger_drive_sync`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/submissions", get(list_submissions))
        .route("/submissions/export", get(export_submissions))
        .route("/submissions/{submission_id}/grade", post(grade_submission_manually))
        .route("/jobs/reminders", post(trigger_reminders))
        .route("/jobs/drive-sync", post(trigger_drive_sync))
}
