//! Grading orchestration.
//!
//! Pulls a submission and its module out of the database, hands the
//! repository to the `grader` crate, and stores the outcome. The external
//! evaluation runs outside any transaction; only the final bookkeeping
//! (swap the grade row, flip the submission status) is transactional, so a
//! slow clone never holds a database lock.

use crate::{email::EmailService, slack};
use chrono::Utc;
use common::config;
use db::models::{grade, module, notification, submission, user};
use db::models::notification::NotificationKind;
use db::models::submission::SubmissionStatus;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, TransactionTrait};
use std::time::Duration;

/// Writer recorded on grades produced by the automated pipeline.
pub const AUTO_GRADER: &str = "auto";

#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("Module not found")]
    ModuleNotFound,

    #[error("Submission is already graded")]
    AlreadyGraded,

    #[error(transparent)]
    Grader(#[from] grader::GraderError),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Tally returned by [`grade_all`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GradeAllOutcome {
    pub graded: usize,
    pub failed: usize,
}

/// Runs the automated evaluation for one submission and stores the grade.
///
/// Transient failures are retried up to the configured limit. Permanent
/// failures are recorded on the submission (`grading_attempts`,
/// `last_grading_error`) and returned to the caller; the submission stays
/// in its pending state so a later run can pick it up again.
pub async fn grade_submission(
    db: &DatabaseConnection,
    submission_id: i64,
    graded_by: &str,
) -> Result<grade::Model, GradingError> {
    let submission = submission::Entity::find_by_id(submission_id)
        .one(db)
        .await?
        .ok_or(GradingError::SubmissionNotFound)?;

    if submission.status == SubmissionStatus::Graded {
        return Err(GradingError::AlreadyGraded);
    }

    let module = module::Entity::find_by_id(submission.module_id)
        .one(db)
        .await?
        .ok_or(GradingError::ModuleNotFound)?;

    let spec = grader::EvaluationSpec {
        script_url: module.grading_script_url.clone(),
        max_points: module.max_points,
        clone_timeout: Duration::from_secs(config::grading_clone_timeout_secs()),
        eval_timeout: Duration::from_secs(config::grading_eval_timeout_secs()),
    };

    let report = match evaluate_with_retries(&submission.github_link, &spec).await {
        Ok(report) => report,
        Err(e) => {
            submission::Model::record_grading_failure(db, submission.id, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    let row = store_grade(
        db,
        &submission,
        report.total_points,
        report.max_points,
        report.breakdown,
        report.feedback,
        serde_json::json!(report.strengths),
        serde_json::json!(report.improvements),
        graded_by,
    )
    .await?;

    notify_graded(db.clone(), submission.user_id, module, row.clone()).await?;
    Ok(row)
}

/// Records a grade decided by an admin, replacing any automated one.
pub async fn apply_manual_grade(
    db: &DatabaseConnection,
    submission_id: i64,
    total_points: f64,
    feedback: Option<String>,
    admin_email: &str,
) -> Result<grade::Model, GradingError> {
    let submission = submission::Entity::find_by_id(submission_id)
        .one(db)
        .await?
        .ok_or(GradingError::SubmissionNotFound)?;

    let module = module::Entity::find_by_id(submission.module_id)
        .one(db)
        .await?
        .ok_or(GradingError::ModuleNotFound)?;

    let total = total_points.clamp(0.0, module.max_points as f64);
    let row = store_grade(
        db,
        &submission,
        total,
        module.max_points,
        serde_json::json!({ "manual": total }),
        feedback,
        serde_json::json!([]),
        serde_json::json!([]),
        admin_email,
    )
    .await?;

    notify_graded(db.clone(), submission.user_id, module, row.clone()).await?;
    Ok(row)
}

/// Grades every submission on a module that is still waiting for one.
/// Individual failures are logged and counted, never fatal.
pub async fn grade_all(
    db: &DatabaseConnection,
    module_id: i64,
) -> Result<GradeAllOutcome, GradingError> {
    module::Entity::find_by_id(module_id)
        .one(db)
        .await?
        .ok_or(GradingError::ModuleNotFound)?;

    let waiting = submission::Model::awaiting_grade_for_module(db, module_id).await?;

    let mut outcome = GradeAllOutcome::default();
    for submission in waiting {
        match grade_submission(db, submission.id, AUTO_GRADER).await {
            Ok(_) => outcome.graded += 1,
            Err(GradingError::Db(e)) => return Err(GradingError::Db(e)),
            Err(e) => {
                tracing::warn!("grading submission {} failed: {}", submission.id, e);
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

async fn evaluate_with_retries(
    repo_url: &str,
    spec: &grader::EvaluationSpec,
) -> Result<grader::ScoreReport, grader::GraderError> {
    let max_retries = config::grading_max_retries();
    let mut attempt = 0;
    loop {
        match grader::evaluate(repo_url, spec).await {
            Ok(report) => return Ok(report),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "evaluation of {} timed out, retrying ({}/{})",
                    repo_url,
                    attempt,
                    max_retries
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Swaps in the new grade row and marks the submission graded, atomically.
#[allow(clippy::too_many_arguments)]
async fn store_grade(
    db: &DatabaseConnection,
    submission: &submission::Model,
    total_points: f64,
    max_points: i32,
    breakdown: serde_json::Value,
    feedback: Option<String>,
    strengths: serde_json::Value,
    improvements: serde_json::Value,
    graded_by: &str,
) -> Result<grade::Model, GradingError> {
    let percentage = grader::percentage(total_points, max_points);
    let letter = grader::letter_grade(percentage);
    let now = Utc::now();

    let txn = db.begin().await?;

    grade::Entity::delete_many()
        .filter(grade::Column::SubmissionId.eq(submission.id))
        .exec(&txn)
        .await?;

    let row = grade::ActiveModel {
        submission_id: Set(submission.id),
        total_points: Set(total_points),
        max_points: Set(max_points),
        percentage: Set(percentage),
        letter_grade: Set(letter.to_string()),
        score_breakdown: Set(breakdown),
        feedback: Set(feedback),
        strengths: Set(strengths),
        improvements: Set(improvements),
        graded_by: Set(graded_by.to_string()),
        graded_at: Set(now),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active: submission::ActiveModel = submission.clone().into();
    active.status = Set(SubmissionStatus::Graded);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(row)
}

/// Fans the good news out to email, Slack and the notification log in the
/// background. Failures are logged, never bubbled up to the grading call.
async fn notify_graded(
    db: DatabaseConnection,
    user_id: i64,
    module: module::Model,
    grade: grade::Model,
) -> Result<(), GradingError> {
    let Some(user) = user::Entity::find_by_id(user_id).one(&db).await? else {
        return Ok(());
    };

    tokio::spawn(async move {
        if let Err(e) = EmailService::send_grade_notification(
            &user.email,
            &user.name,
            &module.title,
            &grade.letter_grade,
            grade.percentage,
            grade.feedback.as_deref(),
        )
        .await
        {
            tracing::warn!("failed to email grade notification to {}: {}", user.email, e);
        }

        slack::post_message(&format!(
            "Graded {} on \"{}\": {} ({:.1}%)",
            user.email, module.title, grade.letter_grade, grade.percentage
        ))
        .await;

        notification::Model::record(
            &db,
            &user.email,
            NotificationKind::GradeReady,
            Some(module.id),
            Some(&format!(
                "{} ({:.1}%)",
                grade.letter_grade, grade.percentage
            )),
        )
        .await;
    });

    Ok(())
}
