//! Shared request and response types for the `/submissions` route group.

use db::models::submission::{self, SubmissionType};
use db::models::grade;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static::lazy_static! {
    static ref GITHUB_LINK_REGEX: regex::Regex =
        regex::Regex::new(r"^https://github\.com/[\w-]+/[\w.-]+/?$").unwrap();
}

/// Request body for `POST /submissions`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionRequest {
    pub module_id: i64,

    pub submission_type: SubmissionType,

    #[validate(regex(
        path = &*GITHUB_LINK_REGEX,
        message = "Link must be a GitHub repository URL like https://github.com/user/repo"
    ))]
    pub github_link: String,

    #[validate(length(max = 2000, message = "Comments must be at most 2000 characters"))]
    pub comments: Option<String>,
}

/// A stored grade as returned to clients.
#[derive(Debug, Serialize, Default)]
pub struct GradeResponse {
    pub total_points: f64,
    pub max_points: i32,
    pub percentage: f64,
    pub letter_grade: String,
    pub score_breakdown: serde_json::Value,
    pub feedback: Option<String>,
    pub strengths: serde_json::Value,
    pub improvements: serde_json::Value,
    pub graded_by: String,
    pub graded_at: String,
}

impl From<grade::Model> for GradeResponse {
    fn from(grade: grade::Model) -> Self {
        Self {
            total_points: grade.total_points,
            max_points: grade.max_points,
            percentage: grade.percentage,
            letter_grade: grade.letter_grade,
            score_breakdown: grade.score_breakdown,
            feedback: grade.feedback,
            strengths: grade.strengths,
            improvements: grade.improvements,
            graded_by: grade.graded_by,
            graded_at: grade.graded_at.to_rfc3339(),
        }
    }
}

/// A submission as returned to clients, with its grade when one exists.
#[derive(Debug, Serialize, Default)]
pub struct SubmissionResponse {
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub submission_type: String,
    pub github_link: String,
    pub comments: Option<String>,
    pub status: String,
    pub grading_attempts: i32,
    pub last_grading_error: Option<String>,
    pub submitted_at: String,
    pub grade: Option<GradeResponse>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(submission: submission::Model) -> Self {
        Self {
            id: submission.id,
            user_id: submission.user_id,
            module_id: submission.module_id,
            submission_type: submission.submission_type.to_string(),
            github_link: submission.github_link,
            comments: submission.comments,
            status: submission.status.to_string(),
            grading_attempts: submission.grading_attempts,
            last_grading_error: submission.last_grading_error,
            submitted_at: submission.submitted_at.to_rfc3339(),
            grade: None,
        }
    }
}

impl SubmissionResponse {
    pub fn with_grade(submission: submission::Model, grade: Option<grade::Model>) -> Self {
        let mut response = Self::from(submission);
        response.grade = grade.map(GradeResponse::from);
        response
    }
}
