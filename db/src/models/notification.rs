use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// What a notification was about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "submission_received")]
    SubmissionReceived,
    #[sea_orm(string_value = "grade_ready")]
    GradeReady,
    #[sea_orm(string_value = "pdf_updated")]
    PdfUpdated,
    #[sea_orm(string_value = "weekly_reminder")]
    WeeklyReminder,
}

/// Audit trail of outbound notifications. Rows are written best-effort;
/// failing to record one never fails the action that triggered it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_email: String,
    pub kind: NotificationKind,
    pub module_id: Option<i64>,
    pub detail: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Appends a notification row, logging instead of failing on error.
    pub async fn record(
        db: &DatabaseConnection,
        user_email: &str,
        kind: NotificationKind,
        module_id: Option<i64>,
        detail: Option<&str>,
    ) {
        let row = ActiveModel {
            user_email: Set(user_email.to_string()),
            kind: Set(kind),
            module_id: Set(module_id),
            detail: Set(detail.map(str::to_string)),
            sent_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Err(e) = row.insert(db).await {
            tracing::warn!("failed to record notification for {}: {}", user_email, e);
        }
    }

    /// Notifications sent to one address, newest first.
    pub async fn for_email(db: &DatabaseConnection, email: &str) -> Result<Vec<Self>, DbErr> {
        use sea_orm::QueryOrder;
        Entity::find()
            .filter(Column::UserEmail.eq(email))
            .order_by_desc(Column::SentAt)
            .all(db)
            .await
    }
}
