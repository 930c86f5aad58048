//! # me Routes Module
//!
//! Defines and wires up routes for the `/me` endpoint group: everything
//! scoped to the calling user.
//!
//! ## Structure
//! - `get.rs`: the caller's selections and submissions
//! - `put.rs`: reminder settings
//! - `common.rs`: shared request/response types

pub mod common;
pub mod get;
pub mod put;

use ::common::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

use get::{my_selections, my_submissions};
use put::update_reminder_settings;

/// Builds the `/me` route group.
///
/// - `GET /me/selections` → `my_selections`
/// - `GET /me/submissions` → `my_submissions`
/// - `PUT /me/reminders` → `update_reminder_settings`
pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/selections", get(my_selections))
        .route("/submissions", get(my_submissions))
        .route("/reminders", put(update_reminder_settings))
}
