//! Shared request and response types for the `/me` route group.

use serde::{Deserialize, Serialize};

use crate::routes::modules::common::{ModuleResponse, SelectionResponse};

/// Request body for `PUT /me/reminders`.
#[derive(Debug, Deserialize)]
pub struct ReminderSettingsRequest {
    pub enabled: bool,
}

/// One of the caller's selections, joined with its module and a flag for
/// course material the caller has not been notified about yet.
#[derive(Debug, Serialize, Default)]
pub struct MySelectionResponse {
    #[serde(flatten)]
    pub selection: SelectionResponse,
    pub module: Option<ModuleResponse>,
    pub material_updated: bool,
}
