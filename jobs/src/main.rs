//! Scheduled maintenance entrypoint.
//!
//! Each run performs one job and exits, so scheduling stays in cron (or
//! whatever the deployment uses) instead of a long-lived in-process timer:
//!
//! ```text
//! 0 9 * * 1  jobs reminders     # weekly digest, Monday mornings
//! 0 * * * *  jobs drive-sync    # hourly course material check
//! ```

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("jobs=info")),
        )
        .init();

    let job = std::env::args().nth(1).unwrap_or_default();
    let db = db::connect().await;

    match job.as_str() {
        "reminders" => match services::reminders::run_weekly_reminders(&db).await {
            Ok(outcome) => {
                tracing::info!(
                    sent = outcome.emails_sent,
                    skipped = outcome.users_skipped,
                    "weekly reminders finished"
                );
            }
            Err(e) => {
                tracing::error!("weekly reminders failed: {}", e);
                std::process::exit(1);
            }
        },
        "drive-sync" => match services::drive_sync::sync_all_modules(&db).await {
            Ok(outcome) => {
                tracing::info!(
                    checked = outcome.checked,
                    updated = outcome.updated,
                    notified = outcome.notified,
                    "drive sync finished"
                );
            }
            Err(e) => {
                tracing::error!("drive sync failed: {}", e);
                std::process::exit(1);
            }
        },
        other => {
            eprintln!("Unknown job: {other:?}");
            eprintln!("Usage: jobs [reminders|drive-sync]");
            std::process::exit(1);
        }
    }
}
