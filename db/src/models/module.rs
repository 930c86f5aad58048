use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder};
use serde::{Deserialize, Serialize};

/// Publication state of a module.
///
/// Non-admin users only ever see `pilot_review` and `active` modules;
/// `draft` is pre-release and `archived` is the soft-deleted end state.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "module_visibility")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleVisibility {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pilot_review")]
    PilotReview,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl Default for ModuleVisibility {
    fn default() -> Self {
        Self::Draft
    }
}

impl ModuleVisibility {
    /// States shown to non-admin users.
    pub fn visible_states() -> [Self; 2] {
        [Self::PilotReview, Self::Active]
    }
}

/// A unit of course content with limited reviewer capacity.
///
/// `occupancy` mirrors the number of active selections and is only ever
/// changed through conditional updates inside the selection transactions,
/// so `0 <= occupancy <= capacity` holds under concurrent selectors.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    /// Primary key of the module.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Module title shown in listings.
    pub title: String,
    /// Week of the course this module belongs to.
    pub week_number: i32,
    /// Short description for the listing page.
    pub description: Option<String>,
    /// Longer instructions shown on the detail page.
    pub instructions: Option<String>,
    /// Maximum number of concurrent active selections.
    pub capacity: i32,
    /// Current number of active selections.
    pub occupancy: i32,
    /// Publication state; see [`ModuleVisibility`].
    pub visibility: ModuleVisibility,
    /// Identifier of the PDF document in the cloud drive.
    pub drive_file_id: Option<String>,
    /// Version token (the drive's `modifiedTime`) of the last seen PDF revision.
    pub drive_version: Option<String>,
    /// Whether submissions are auto-graded on arrival.
    pub grading_enabled: bool,
    /// Optional URL of an external evaluation script.
    pub grading_script_url: Option<String>,
    /// Maximum points a grade for this module can award.
    pub max_points: i32,
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

/// Registry errors surfaced to the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Module not found")]
    NotFound,

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Fields an administrator may change on an existing module.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ModuleChanges {
    pub title: Option<String>,
    pub week_number: Option<i32>,
    pub description: Option<Option<String>>,
    pub instructions: Option<Option<String>>,
    pub capacity: Option<i32>,
    pub visibility: Option<ModuleVisibility>,
    pub drive_file_id: Option<Option<String>>,
    pub grading_enabled: Option<bool>,
    pub grading_script_url: Option<Option<String>>,
    pub max_points: Option<i32>,
}

impl Model {
    /// Whether non-admin users may see this module.
    pub fn is_visible(&self) -> bool {
        ModuleVisibility::visible_states().contains(&self.visibility)
    }

    /// Number of free seats left.
    pub fn seats_left(&self) -> i32 {
        (self.capacity - self.occupancy).max(0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        title: &str,
        week_number: i32,
        description: Option<&str>,
        instructions: Option<&str>,
        capacity: i32,
        drive_file_id: Option<&str>,
        grading_enabled: bool,
        grading_script_url: Option<&str>,
        max_points: i32,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            title: Set(title.to_string()),
            week_number: Set(week_number),
            description: Set(description.map(|s| s.to_string())),
            instructions: Set(instructions.map(|s| s.to_string())),
            capacity: Set(capacity),
            occupancy: Set(0),
            visibility: Set(ModuleVisibility::Draft),
            drive_file_id: Set(drive_file_id.map(|s| s.to_string())),
            drive_version: Set(None),
            grading_enabled: Set(grading_enabled),
            grading_script_url: Set(grading_script_url.map(|s| s.to_string())),
            max_points: Set(max_points),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Applies the given changes to an existing module.
    pub async fn edit(
        db: &DatabaseConnection,
        module_id: i64,
        changes: ModuleChanges,
    ) -> Result<Self, ModuleError> {
        let module = Entity::find_by_id(module_id)
            .one(db)
            .await?
            .ok_or(ModuleError::NotFound)?;

        let mut active: ActiveModel = module.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(week) = changes.week_number {
            active.week_number = Set(week);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(instructions) = changes.instructions {
            active.instructions = Set(instructions);
        }
        if let Some(capacity) = changes.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(visibility) = changes.visibility {
            active.visibility = Set(visibility);
        }
        if let Some(drive_file_id) = changes.drive_file_id {
            // New document, new version history.
            active.drive_version = Set(None);
            active.drive_file_id = Set(drive_file_id);
        }
        if let Some(grading_enabled) = changes.grading_enabled {
            active.grading_enabled = Set(grading_enabled);
        }
        if let Some(grading_script_url) = changes.grading_script_url {
            active.grading_script_url = Set(grading_script_url);
        }
        if let Some(max_points) = changes.max_points {
            active.max_points = Set(max_points);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    /// Soft delete: moves the module to the archived state.
    pub async fn archive(db: &DatabaseConnection, module_id: i64) -> Result<Self, ModuleError> {
        Self::edit(
            db,
            module_id,
            ModuleChanges {
                visibility: Some(ModuleVisibility::Archived),
                ..Default::default()
            },
        )
        .await
    }

    /// Records a new drive version token after a PDF revision was detected.
    pub async fn set_drive_version(
        &self,
        db: &DatabaseConnection,
        version: &str,
    ) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.clone().into();
        active.drive_version = Set(Some(version.to_string()));
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Modules a non-admin user may browse, ordered by week.
    pub async fn list_visible(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::Visibility.is_in(ModuleVisibility::visible_states()))
            .order_by_asc(Column::WeekNumber)
            .all(db)
            .await
    }

    /// Every module regardless of state, ordered by week. Admin listing.
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find().order_by_asc(Column::WeekNumber).all(db).await
    }
}
