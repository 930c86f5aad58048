//! Weekly reminder digests.
//!
//! Triggered by the jobs binary (typically from cron once a week). For each
//! user who has reminders enabled and was not reminded within the last six
//! days, collects what is still outstanding across their active selections
//! and sends a single digest email.

use crate::{email::EmailService, slack};
use chrono::{Duration, Utc};
use db::models::notification::NotificationKind;
use db::models::{module, notification, selection, submission, user};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryFilter};

/// Tally returned by [`run_weekly_reminders`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ReminderOutcome {
    pub emails_sent: usize,
    pub users_skipped: usize,
}

/// Sends the weekly digest to everyone who is due one.
///
/// A user is skipped when their last reminder is less than six days old or
/// when nothing is actually outstanding, so re-running the job is harmless.
pub async fn run_weekly_reminders(db: &DatabaseConnection) -> Result<ReminderOutcome, DbErr> {
    let users = user::Entity::find()
        .filter(user::Column::ReminderEnabled.eq(true))
        .all(db)
        .await?;

    let cutoff = Utc::now() - Duration::days(6);
    let mut outcome = ReminderOutcome::default();

    for user in users {
        if let Some(last) = user.last_reminder_sent {
            if last > cutoff {
                outcome.users_skipped += 1;
                continue;
            }
        }

        let items = outstanding_items(db, user.id).await?;
        if items.is_empty() {
            outcome.users_skipped += 1;
            continue;
        }

        match EmailService::send_reminder(&user.email, &user.name, &items).await {
            Ok(()) => {
                user.mark_reminded(db).await?;
                notification::Model::record(
                    db,
                    &user.email,
                    NotificationKind::WeeklyReminder,
                    None,
                    Some(&items.join("; ")),
                )
                .await;
                outcome.emails_sent += 1;
            }
            Err(e) => {
                // Left unmarked so the next run tries again.
                tracing::warn!("failed to send reminder to {}: {}", user.email, e);
                outcome.users_skipped += 1;
            }
        }
    }

    if outcome.emails_sent > 0 {
        slack::post_message(&format!(
            "Weekly reminders: {} sent, {} skipped.",
            outcome.emails_sent, outcome.users_skipped
        ))
        .await;
    }

    Ok(outcome)
}

/// What a user still owes (or should look at) across their active
/// selections, one line per finding.
async fn outstanding_items(db: &DatabaseConnection, user_id: i64) -> Result<Vec<String>, DbErr> {
    let selections = selection::Model::active_for_user(db, user_id).await?;
    let mut items = Vec::new();

    for sel in selections {
        let Some(module) = module::Entity::find_by_id(sel.module_id).one(db).await? else {
            continue;
        };

        let submissions = submission::Model::for_user_module(db, user_id, sel.module_id).await?;
        if submissions.is_empty() {
            items.push(format!("\"{}\": no submission yet", module.title));
        } else if submissions.iter().any(|s| s.is_awaiting_grade()) {
            items.push(format!("\"{}\": submission awaiting grade", module.title));
        }

        if module.drive_version.is_some() && module.drive_version != sel.notified_version {
            items.push(format!(
                "\"{}\": course material was updated",
                module.title
            ));
        }
    }

    Ok(items)
}
