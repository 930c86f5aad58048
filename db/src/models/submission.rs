use crate::models::{grade, selection};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};

/// Which assignment slot a submission fills. A user gets one slot of each
/// kind per module.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "submission_type")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionType {
    #[sea_orm(string_value = "in_class")]
    InClass,
    #[sea_orm(string_value = "homework")]
    Homework,
}

/// Grading state of a submission.
///
/// `Pending` and `RegradeRequested` both mean "waiting for a grade"; the
/// latter additionally records that an earlier grade existed and was thrown
/// away when the regrade was requested.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "submission_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "graded")]
    Graded,
    #[sea_orm(string_value = "regrade_requested")]
    RegradeRequested,
}

/// A GitHub repository handed in against a module slot.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub submission_type: SubmissionType,
    /// Link to the submitted repository, validated at the API boundary.
    pub github_link: String,
    pub comments: Option<String>,
    pub status: SubmissionStatus,
    /// How many grading runs have failed for this submission.
    pub grading_attempts: i32,
    /// Message from the most recent failed grading run.
    pub last_grading_error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,

    #[sea_orm(has_many = "super::grade::Entity")]
    Grade,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Submission failures surfaced to the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission not found")]
    NotFound,

    #[error("You must select this module before submitting")]
    NotSelected,

    #[error("A submission of this type already exists for this module")]
    DuplicateSubmission,

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl Model {
    /// Whether a grading run should pick this submission up.
    pub fn is_awaiting_grade(&self) -> bool {
        matches!(
            self.status,
            SubmissionStatus::Pending | SubmissionStatus::RegradeRequested
        )
    }

    /// Hands in a repository link for one of the user's selected modules.
    ///
    /// The user must hold an active selection on the module, and each
    /// (user, module, type) slot accepts exactly one submission. A second
    /// attempt on a filled slot is rejected rather than overwritten.
    pub async fn submit(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
        submission_type: SubmissionType,
        github_link: &str,
        comments: Option<&str>,
    ) -> Result<Self, SubmissionError> {
        let selected = selection::Model::find_active(db, user_id, module_id)
            .await?
            .is_some();
        if !selected {
            return Err(SubmissionError::NotSelected);
        }

        let taken = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::SubmissionType.eq(submission_type))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(SubmissionError::DuplicateSubmission);
        }

        let now = Utc::now();
        let submission = ActiveModel {
            user_id: Set(user_id),
            module_id: Set(module_id),
            submission_type: Set(submission_type),
            github_link: Set(github_link.to_string()),
            comments: Set(comments.map(str::to_string)),
            status: Set(SubmissionStatus::Pending),
            grading_attempts: Set(0),
            last_grading_error: Set(None),
            submitted_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(submission)
    }

    /// Throws away the current grade and queues the submission for another
    /// grading run.
    ///
    /// Only graded submissions qualify. The grade row is deleted in the same
    /// transaction that flips the status, so no reader ever sees a grade on
    /// a submission that is back in the queue.
    pub async fn request_regrade(
        db: &DatabaseConnection,
        submission_id: i64,
    ) -> Result<Self, SubmissionError> {
        let txn = db.begin().await?;

        let submission = Entity::find_by_id(submission_id)
            .one(&txn)
            .await?
            .ok_or(SubmissionError::NotFound)?;

        if submission.status != SubmissionStatus::Graded {
            txn.rollback().await?;
            return Err(SubmissionError::InvalidState(
                "Only graded submissions can be regraded",
            ));
        }

        grade::Entity::delete_many()
            .filter(grade::Column::SubmissionId.eq(submission_id))
            .exec(&txn)
            .await?;

        let mut active: ActiveModel = submission.into();
        active.status = Set(SubmissionStatus::RegradeRequested);
        active.updated_at = Set(Utc::now());
        let submission = active.update(&txn).await?;

        txn.commit().await?;
        Ok(submission)
    }

    /// Records a failed grading run against the submission.
    pub async fn record_grading_failure(
        db: &DatabaseConnection,
        submission_id: i64,
        message: &str,
    ) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(
                Column::GradingAttempts,
                sea_orm::sea_query::Expr::col(Column::GradingAttempts).add(1),
            )
            .col_expr(
                Column::LastGradingError,
                sea_orm::sea_query::Expr::value(Some(message.to_string())),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(Utc::now()))
            .filter(Column::Id.eq(submission_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// All submissions a user has made, newest first.
    pub async fn for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::SubmittedAt)
            .all(db)
            .await
    }

    /// A user's submissions against one module.
    pub async fn for_user_module(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .all(db)
            .await
    }

    /// Every submission on a module still waiting for a grade.
    pub async fn awaiting_grade_for_module(
        db: &DatabaseConnection,
        module_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.is_in([
                SubmissionStatus::Pending,
                SubmissionStatus::RegradeRequested,
            ]))
            .order_by_asc(Column::SubmittedAt)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{module::Model as Module, user::Model as User};
    use crate::test_utils::setup_test_db;

    async fn seed_selected_user(db: &DatabaseConnection) -> (User, Module) {
        let user = User::upsert_from_identity(db, "g-1", "dev@example.com", "Dev", None, false)
            .await
            .unwrap();
        let module = Module::create(
            db,
            "Ownership Deep Dive",
            2,
            None,
            None,
            10,
            None,
            false,
            None,
            100,
        )
        .await
        .unwrap();
        selection::Model::select(db, user.id, module.id)
            .await
            .unwrap();
        (user, module)
    }

    #[tokio::test]
    async fn submit_requires_an_active_selection() {
        let db = setup_test_db().await;
        let user = User::upsert_from_identity(&db, "g-1", "dev@example.com", "Dev", None, false)
            .await
            .unwrap();
        let module = Module::create(&db, "Intro", 1, None, None, 10, None, false, None, 100)
            .await
            .unwrap();

        let err = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/intro",
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SubmissionError::NotSelected));
    }

    #[tokio::test]
    async fn submit_fills_a_slot_once() {
        let db = setup_test_db().await;
        let (user, module) = seed_selected_user(&db).await;

        let submission = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/ownership",
            Some("first pass"),
        )
        .await
        .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert!(submission.is_awaiting_grade());

        let err = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/ownership-v2",
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SubmissionError::DuplicateSubmission));
    }

    #[tokio::test]
    async fn in_class_and_homework_slots_are_independent() {
        let db = setup_test_db().await;
        let (user, module) = seed_selected_user(&db).await;

        Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::InClass,
            "https://github.com/dev/in-class",
            None,
        )
        .await
        .unwrap();
        Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/homework",
            None,
        )
        .await
        .unwrap();

        let all = Model::for_user_module(&db, user.id, module.id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn regrade_rejects_ungraded_submissions() {
        let db = setup_test_db().await;
        let (user, module) = seed_selected_user(&db).await;
        let submission = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/ownership",
            None,
        )
        .await
        .unwrap();

        let err = Model::request_regrade(&db, submission.id).await.unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidState(_)));
    }

    #[tokio::test]
    async fn regrade_drops_the_grade_and_requeues() {
        let db = setup_test_db().await;
        let (user, module) = seed_selected_user(&db).await;
        let submission = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/ownership",
            None,
        )
        .await
        .unwrap();

        // Grade it by hand, the way a finished grading run would.
        let now = Utc::now();
        grade::ActiveModel {
            submission_id: Set(submission.id),
            total_points: Set(88.0),
            max_points: Set(100),
            percentage: Set(88.0),
            letter_grade: Set("B+".to_string()),
            score_breakdown: Set(serde_json::json!({"documentation": 10})),
            feedback: Set(None),
            strengths: Set(serde_json::json!([])),
            improvements: Set(serde_json::json!([])),
            graded_by: Set("auto".to_string()),
            graded_at: Set(now),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let mut active: ActiveModel = submission.clone().into();
        active.status = Set(SubmissionStatus::Graded);
        active.update(&db).await.unwrap();

        let requeued = Model::request_regrade(&db, submission.id).await.unwrap();
        assert_eq!(requeued.status, SubmissionStatus::RegradeRequested);
        assert!(requeued.is_awaiting_grade());
        assert!(grade::Model::for_submission(&db, submission.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn grading_failures_are_counted() {
        let db = setup_test_db().await;
        let (user, module) = seed_selected_user(&db).await;
        let submission = Model::submit(
            &db,
            user.id,
            module.id,
            SubmissionType::Homework,
            "https://github.com/dev/ownership",
            None,
        )
        .await
        .unwrap();

        Model::record_grading_failure(&db, submission.id, "clone timed out")
            .await
            .unwrap();
        Model::record_grading_failure(&db, submission.id, "clone timed out again")
            .await
            .unwrap();

        let submission = Entity::find_by_id(submission.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.grading_attempts, 2);
        assert_eq!(
            submission.last_grading_error.as_deref(),
            Some("clone timed out again")
        );
        assert_eq!(submission.status, SubmissionStatus::Pending);
    }
}
