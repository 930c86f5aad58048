//! Shared request and response types for the `/modules` route group.

use db::models::module::{self, ModuleChanges, ModuleVisibility};
use db::models::selection;
use serde::{Deserialize, Serialize};
use services::drive_sync::ModuleSyncResult;
use services::grading::GradeAllOutcome;
use validator::Validate;

/// Request body for `POST /modules`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(range(min = 1, max = 52, message = "Week number must be between 1 and 52"))]
    pub week_number: i32,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 10000, message = "Instructions must be at most 10000 characters"))]
    pub instructions: Option<String>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,

    pub drive_file_id: Option<String>,

    #[serde(default)]
    pub grading_enabled: bool,

    #[validate(url(message = "Grading script URL must be a valid URL"))]
    pub grading_script_url: Option<String>,

    #[serde(default = "default_max_points")]
    #[validate(range(min = 1, message = "Max points must be at least 1"))]
    pub max_points: i32,
}

fn default_max_points() -> i32 {
    100
}

/// Request body for `PUT /modules/{module_id}`.
///
/// Absent fields keep their stored value, so an admin can flip visibility
/// without resending the whole module.
#[derive(Debug, Deserialize, Validate)]
pub struct EditModuleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 1, max = 52, message = "Week number must be between 1 and 52"))]
    pub week_number: Option<i32>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 10000, message = "Instructions must be at most 10000 characters"))]
    pub instructions: Option<String>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,

    pub visibility: Option<ModuleVisibility>,

    pub drive_file_id: Option<String>,

    pub grading_enabled: Option<bool>,

    #[validate(url(message = "Grading script URL must be a valid URL"))]
    pub grading_script_url: Option<String>,

    #[validate(range(min = 1, message = "Max points must be at least 1"))]
    pub max_points: Option<i32>,
}

impl EditModuleRequest {
    pub fn into_changes(self) -> ModuleChanges {
        ModuleChanges {
            title: self.title,
            week_number: self.week_number,
            description: self.description.map(Some),
            instructions: self.instructions.map(Some),
            capacity: self.capacity,
            visibility: self.visibility,
            drive_file_id: self.drive_file_id.map(Some),
            grading_enabled: self.grading_enabled,
            grading_script_url: self.grading_script_url.map(Some),
            max_points: self.max_points,
        }
    }
}

/// Module view returned to regular users. Drive internals stay hidden;
/// `has_material` tells the frontend whether a PDF can be fetched.
#[derive(Debug, Serialize, Default)]
pub struct ModuleResponse {
    pub id: i64,
    pub title: String,
    pub week_number: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub capacity: i32,
    pub occupancy: i32,
    pub seats_left: i32,
    pub visibility: String,
    pub has_material: bool,
    pub grading_enabled: bool,
    pub max_points: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<module::Model> for ModuleResponse {
    fn from(module: module::Model) -> Self {
        Self {
            id: module.id,
            title: module.title.clone(),
            week_number: module.week_number,
            description: module.description.clone(),
            instructions: module.instructions.clone(),
            capacity: module.capacity,
            occupancy: module.occupancy,
            seats_left: module.seats_left(),
            visibility: module.visibility.to_string(),
            has_material: module.drive_file_id.is_some(),
            grading_enabled: module.grading_enabled,
            max_points: module.max_points,
            created_at: module.created_at.to_rfc3339(),
            updated_at: module.updated_at.to_rfc3339(),
        }
    }
}

/// Module view returned to admins, including drive and grading wiring.
#[derive(Debug, Serialize, Default)]
pub struct AdminModuleResponse {
    #[serde(flatten)]
    pub module: ModuleResponse,
    pub drive_file_id: Option<String>,
    pub drive_version: Option<String>,
    pub grading_script_url: Option<String>,
}

impl From<module::Model> for AdminModuleResponse {
    fn from(module: module::Model) -> Self {
        let drive_file_id = module.drive_file_id.clone();
        let drive_version = module.drive_version.clone();
        let grading_script_url = module.grading_script_url.clone();
        Self {
            module: ModuleResponse::from(module),
            drive_file_id,
            drive_version,
            grading_script_url,
        }
    }
}

/// A selection as returned from select/release calls.
#[derive(Debug, Serialize, Default)]
pub struct SelectionResponse {
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub status: String,
    pub notified_version: Option<String>,
    pub selected_at: String,
    pub released_at: Option<String>,
}

impl From<selection::Model> for SelectionResponse {
    fn from(selection: selection::Model) -> Self {
        Self {
            id: selection.id,
            user_id: selection.user_id,
            module_id: selection.module_id,
            status: selection.status.to_string(),
            notified_version: selection.notified_version,
            selected_at: selection.selected_at.to_rfc3339(),
            released_at: selection.released_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response body for `POST /modules/{module_id}/check-update`.
#[derive(Debug, Serialize, Default)]
pub struct CheckUpdateResponse {
    pub module_id: i64,
    pub version: String,
    pub updated: bool,
    pub notified: usize,
}

impl From<ModuleSyncResult> for CheckUpdateResponse {
    fn from(result: ModuleSyncResult) -> Self {
        Self {
            module_id: result.module_id,
            version: result.version,
            updated: result.updated,
            notified: result.notified,
        }
    }
}

/// Response body for `POST /modules/{module_id}/grade-all`.
#[derive(Debug, Serialize, Default)]
pub struct GradeAllResponse {
    pub graded: usize,
    pub failed: usize,
}

impl From<GradeAllOutcome> for GradeAllResponse {
    fn from(outcome: GradeAllOutcome) -> Self {
        Self {
            graded: outcome.graded,
            failed: outcome.failed,
        }
    }
}
