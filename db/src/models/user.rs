use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder};
use serde::{Deserialize, Serialize};

/// Portal-wide role attached to every account.
///
/// Checked by the request guards; there is no per-module role layering.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    /// External reviewer working through course material.
    #[sea_orm(string_value = "reviewer")]
    Reviewer,
    /// Enrolled student.
    #[sea_orm(string_value = "student")]
    Student,
    /// Full administrative access.
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Reviewer
    }
}

/// An authenticated portal account, provisioned on first OAuth login.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key of the user.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stable subject identifier from the OAuth provider.
    #[sea_orm(unique)]
    pub google_id: String,
    /// Email address reported by the provider.
    #[sea_orm(unique)]
    pub email: String,
    /// Display name.
    pub name: String,
    /// Avatar URL from the provider, if any.
    pub picture_url: Option<String>,
    /// Portal role; see [`UserRole`].
    pub role: UserRole,
    /// Whether the weekly reminder digest is sent to this user.
    pub reminder_enabled: bool,
    /// When the last reminder digest went out.
    pub last_reminder_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::selection::Entity")]
    Selection,

    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,
}

impl Related<super::selection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selection.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this account may use the admin surface.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Creates or refreshes an account from a verified OAuth identity.
    ///
    /// Looks the user up by provider subject id. On first login a row is
    /// inserted; on later logins the profile fields are refreshed so name
    /// and picture changes at the provider propagate. Accounts whose email
    /// is on the configured admin list are promoted to [`UserRole::Admin`];
    /// existing admins are never demoted here.
    pub async fn upsert_from_identity(
        db: &DatabaseConnection,
        google_id: &str,
        email: &str,
        name: &str,
        picture_url: Option<&str>,
        admin_email: bool,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();

        if let Some(existing) = Entity::find()
            .filter(Column::GoogleId.eq(google_id))
            .one(db)
            .await?
        {
            let role = if admin_email || existing.role == UserRole::Admin {
                UserRole::Admin
            } else {
                existing.role
            };

            let mut active: ActiveModel = existing.into();
            active.email = Set(email.to_string());
            active.name = Set(name.to_string());
            active.picture_url = Set(picture_url.map(|s| s.to_string()));
            active.role = Set(role);
            active.updated_at = Set(now);
            return active.update(db).await;
        }

        let role = if admin_email {
            UserRole::Admin
        } else {
            UserRole::default()
        };

        let active = ActiveModel {
            google_id: Set(google_id.to_string()),
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            picture_url: Set(picture_url.map(|s| s.to_string())),
            role: Set(role),
            reminder_enabled: Set(true),
            last_reminder_sent: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    /// Changes a user's role. Returns `None` when the user does not exist.
    pub async fn set_role(
        db: &DatabaseConnection,
        user_id: i64,
        role: UserRole,
    ) -> Result<Option<Self>, DbErr> {
        let Some(user) = Entity::find_by_id(user_id).one(db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map(Some)
    }

    /// Toggles the weekly reminder digest for a user.
    pub async fn set_reminder_enabled(
        db: &DatabaseConnection,
        user_id: i64,
        enabled: bool,
    ) -> Result<Option<Self>, DbErr> {
        let Some(user) = Entity::find_by_id(user_id).one(db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = user.into();
        active.reminder_enabled = Set(enabled);
        active.updated_at = Set(Utc::now());
        active.update(db).await.map(Some)
    }

    /// Stamps the reminder timestamp after a digest was sent.
    pub async fn mark_reminded(&self, db: &DatabaseConnection) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.clone().into();
        active.last_reminder_sent = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// All users, newest first. Admin listing helper.
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await
    }
}
