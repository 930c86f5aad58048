//! Course material version tracking.
//!
//! Each module stores the drive file's `modifiedTime` as an opaque version
//! token. The sync job compares the live token against the stored one and,
//! when it moved, tells every active selector who has not seen the new
//! version yet. Per-selection `notified_version` bookkeeping keeps repeat
//! runs from re-sending the same news.

use crate::drive::{self, DriveError};
use crate::email::EmailService;
use db::models::notification::NotificationKind;
use db::models::{module, notification, selection, user};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Module not found")]
    ModuleNotFound,

    #[error("Module has no drive file attached")]
    NoDriveFile,

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// What one module's sync found.
#[derive(Debug, Clone)]
pub struct ModuleSyncResult {
    pub module_id: i64,
    pub version: String,
    pub updated: bool,
    pub notified: usize,
}

/// Tally returned by [`sync_all_modules`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOutcome {
    pub checked: usize,
    pub updated: usize,
    pub notified: usize,
}

/// Compares one module's stored version token against drive and notifies
/// selectors when the material changed.
pub async fn check_module_update(
    db: &DatabaseConnection,
    module_id: i64,
) -> Result<ModuleSyncResult, SyncError> {
    let module = module::Entity::find_by_id(module_id)
        .one(db)
        .await?
        .ok_or(SyncError::ModuleNotFound)?;

    let file_id = module
        .drive_file_id
        .as_deref()
        .ok_or(SyncError::NoDriveFile)?;

    let meta = drive::file_metadata(file_id).await?;

    if module.drive_version.as_deref() == Some(meta.modified_time.as_str()) {
        return Ok(ModuleSyncResult {
            module_id,
            version: meta.modified_time,
            updated: false,
            notified: 0,
        });
    }

    let notified = apply_new_version(db, &module, &meta.modified_time).await?;
    Ok(ModuleSyncResult {
        module_id,
        version: meta.modified_time,
        updated: true,
        notified,
    })
}

/// Walks every non-archived module with a drive file. Drive failures on one
/// module are logged and counted as checked; the sweep continues.
pub async fn sync_all_modules(db: &DatabaseConnection) -> Result<SyncOutcome, SyncError> {
    let modules = module::Entity::find()
        .filter(module::Column::DriveFileId.is_not_null())
        .filter(module::Column::Visibility.ne(module::ModuleVisibility::Archived))
        .all(db)
        .await?;

    let mut outcome = SyncOutcome::default();
    for m in modules {
        outcome.checked += 1;
        match check_module_update(db, m.id).await {
            Ok(result) if result.updated => {
                outcome.updated += 1;
                outcome.notified += result.notified;
            }
            Ok(_) => {}
            Err(SyncError::Db(e)) => return Err(SyncError::Db(e)),
            Err(e) => {
                tracing::warn!("drive sync failed for module {}: {}", m.id, e);
            }
        }
    }

    Ok(outcome)
}

/// Stores the new version token and notifies every active selector who has
/// not been told about it. Returns how many were notified.
async fn apply_new_version(
    db: &DatabaseConnection,
    module: &module::Model,
    version: &str,
) -> Result<usize, SyncError> {
    module.set_drive_version(db, version).await?;

    let mut notified = 0;
    for sel in selection::Model::active_for_module(db, module.id).await? {
        if sel.notified_version.as_deref() == Some(version) {
            continue;
        }

        let Some(user) = user::Entity::find_by_id(sel.user_id).one(db).await? else {
            continue;
        };

        if let Err(e) =
            EmailService::send_material_update(&user.email, &user.name, &module.title).await
        {
            tracing::warn!("failed to email material update to {}: {}", user.email, e);
            continue;
        }

        sel.set_notified_version(db, version).await?;
        notification::Model::record(
            db,
            &user.email,
            NotificationKind::PdfUpdated,
            Some(module.id),
            Some(version),
        )
        .await;
        notified += 1;
    }

    Ok(notified)
}
