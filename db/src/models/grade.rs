use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of a grading run, automated or manual. One per submission; a
/// regrade deletes the old row before a new one is written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub submission_id: i64,
    pub total_points: f64,
    pub max_points: i32,
    pub percentage: f64,
    pub letter_grade: String,
    /// Per-category points as a JSON object, e.g. `{"documentation": 10}`.
    pub score_breakdown: Json,
    pub feedback: Option<String>,
    /// JSON arrays of free-text remarks from the evaluation.
    pub strengths: Json,
    pub improvements: Json,
    /// `"auto"` for the automated pipeline, otherwise the admin's email.
    pub graded_by: String,
    pub graded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submission::Entity",
        from = "Column::SubmissionId",
        to = "super::submission::Column::Id"
    )]
    Submission,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The grade attached to a submission, if one exists.
    pub async fn for_submission(
        db: &DatabaseConnection,
        submission_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .one(db)
            .await
    }
}
