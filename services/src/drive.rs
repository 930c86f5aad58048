//! Thin client for the Google Drive v3 files API.
//!
//! Modules point at drive-hosted PDFs by file id. Two calls matter here:
//! metadata (for the `modifiedTime` used as a version token) and a raw
//! `alt=media` download that the API layer streams through to the browser.

use common::config;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build Drive HTTP client")
});

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Drive file not found")]
    NotFound,

    #[error("Drive API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Drive request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Subset of the Drive file resource the portal cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFileMeta {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// RFC 3339 modification stamp; used verbatim as the version token.
    #[serde(rename = "modifiedTime")]
    pub modified_time: String,
    #[serde(default)]
    pub size: Option<String>,
}

/// Fetches metadata for a drive file.
pub async fn file_metadata(file_id: &str) -> Result<DriveFileMeta, DriveError> {
    let url = format!(
        "{}/files/{}?fields=id,name,mimeType,modifiedTime,size",
        config::drive_api_base(),
        file_id
    );

    let response = authorized(CLIENT.get(&url)).send().await?;
    match response.status() {
        status if status.is_success() => Ok(response.json::<DriveFileMeta>().await?),
        reqwest::StatusCode::NOT_FOUND => Err(DriveError::NotFound),
        status => Err(DriveError::Api {
            status,
            body: response.text().await.unwrap_or_default(),
        }),
    }
}

/// Starts a media download for a drive file.
///
/// The response is returned unconsumed so callers can stream the body
/// instead of buffering course PDFs in memory.
pub async fn download(file_id: &str) -> Result<reqwest::Response, DriveError> {
    let url = format!(
        "{}/files/{}?alt=media",
        config::drive_api_base(),
        file_id
    );

    let response = authorized(CLIENT.get(&url)).send().await?;
    match response.status() {
        status if status.is_success() => Ok(response),
        reqwest::StatusCode::NOT_FOUND => Err(DriveError::NotFound),
        status => Err(DriveError::Api {
            status,
            body: response.text().await.unwrap_or_default(),
        }),
    }
}

fn authorized(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let token = config::drive_api_token();
    if token.is_empty() {
        request
    } else {
        request.bearer_auth(token)
    }
}
