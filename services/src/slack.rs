//! Best-effort Slack notifications via an incoming webhook.
//!
//! Slack is a convenience channel, so nothing here returns an error: a
//! missing webhook URL or a failed post is logged and reported as `false`,
//! and the caller moves on.

use once_cell::sync::Lazy;
use std::time::Duration;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build Slack HTTP client")
});

/// Posts a plain text message to the configured channel. Returns whether
/// the message was accepted.
pub async fn post_message(text: &str) -> bool {
    let webhook_url = common::config::slack_webhook_url();
    if webhook_url.is_empty() {
        tracing::debug!("Slack webhook not configured, skipping message");
        return false;
    }

    let payload = serde_json::json!({ "text": text });
    match CLIENT.post(&webhook_url).json(&payload).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            tracing::warn!(status = %response.status(), "Slack webhook rejected message");
            false
        }
        Err(e) => {
            tracing::warn!("Slack webhook request failed: {}", e);
            false
        }
    }
}
