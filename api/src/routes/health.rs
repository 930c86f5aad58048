use crate::response::ApiResponse;
use axum::{Json, Router, response::IntoResponse, routing::get};
use common::state::AppState;

/// Builds the `/health` route group.
///
/// A single unauthenticated `GET /health` endpoint used by uptime probes
/// and deployment checks.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// Returns a static success response to show the API is up.
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "success": true,
///   "data": "OK",
///   "message": "Service healthy"
/// }
/// ```
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK", "Service healthy"))
}
