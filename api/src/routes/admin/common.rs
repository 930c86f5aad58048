//! Shared request and response types for the `/admin` route group.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::routes::submissions::common::SubmissionResponse;

/// Query parameters for `GET /admin/submissions` and the CSV export.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionFilterQuery {
    pub module_id: Option<i64>,
    pub user_id: Option<i64>,
    /// `pending`, `graded` or `regrade_requested`.
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// One page of submissions for the admin dashboard.
#[derive(Debug, Serialize, Default)]
pub struct PaginatedSubmissionResponse {
    pub submissions: Vec<SubmissionResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// Request body for `POST /admin/submissions/{submission_id}/grade`.
#[derive(Debug, Deserialize, Validate)]
pub struct ManualGradeRequest {
    #[validate(range(min = 0.0, message = "Total points must not be negative"))]
    pub total_points: f64,

    #[validate(length(max = 5000, message = "Feedback must be at most 5000 characters"))]
    pub feedback: Option<String>,
}

/// Response body for `POST /admin/jobs/reminders`.
#[derive(Debug, Serialize, Default)]
pub struct ReminderJobResponse {
    pub emails_sent: usize,
    pub users_skipped: usize,
}

/// Response body for `POST /admin/jobs/drive-sync`.
#[derive(Debug, Serialize, Default)]
pub struct DriveSyncJobResponse {
    pub checked: usize,
    pub updated: usize,
    pub notified: usize,
}
