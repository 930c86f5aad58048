//! Google sign-in verification.
//!
//! The frontend completes the OAuth dance and hands us a Google ID token;
//! we confirm it with Google's `tokeninfo` endpoint rather than keeping a
//! JWKS cache. Google answers with the token's claims as strings, or HTTP
//! 400 for anything expired or forged.

use common::config;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build OAuth HTTP client")
});

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Invalid or expired Google token")]
    InvalidToken,

    #[error("Google token was issued for a different application")]
    AudienceMismatch,

    #[error("Google account email is not verified")]
    EmailUnverified,

    #[error("token verification request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The identity claims the portal keeps from a verified Google token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// The `tokeninfo` endpoint renders every claim as a string.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: Option<String>,
}

/// Verifies a Google ID token and returns the identity it asserts.
///
/// The audience check is enforced whenever a client id is configured; the
/// email must be verified by Google either way.
pub async fn verify_id_token(id_token: &str) -> Result<VerifiedIdentity, OAuthError> {
    let url = format!("{}?id_token={}", config::google_tokeninfo_url(), id_token);

    let response = CLIENT.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(OAuthError::InvalidToken);
    }

    let info: TokenInfo = response
        .json()
        .await
        .map_err(|_| OAuthError::InvalidToken)?;

    let client_id = config::google_client_id();
    if !client_id.is_empty() && info.aud != client_id {
        return Err(OAuthError::AudienceMismatch);
    }

    if info.email_verified != "true" {
        return Err(OAuthError::EmailUnverified);
    }

    let name = if info.name.is_empty() {
        info.email
            .split('@')
            .next()
            .unwrap_or(&info.email)
            .to_string()
    } else {
        info.name
    };

    Ok(VerifiedIdentity {
        google_id: info.sub,
        email: info.email,
        name,
        picture: info.picture,
    })
}
