//! Stored Spotify credentials.
//!
//! The interactive OAuth dance happens elsewhere (any tool that can write
//! the credentials file works); this module only loads the stored grant and
//! keeps the access token fresh via the refresh-token flow. The client id
//! and secret come from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` so
//! secrets never land in the config file.

use std::env;
use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Refresh this long before the stored expiry to avoid racing the clock.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Auth("could not find config directory".into()))?
            .join("trueshuffle");
        fs::create_dir_all(&dir)?;
        Ok(dir.join(CREDENTIALS_FILE_NAME))
    }

    /// Load the stored grant. A missing file is an auth error: this tool
    /// runs unattended and cannot start the authorization flow itself.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Err(Error::Auth(format!(
                "no credentials file at {} (run your authorization helper first)",
                path.display()
            )));
        }
        let contents = fs::read_to_string(&path)?;
        let credentials: Credentials = serde_json::from_str(&contents)
            .map_err(|e| Error::Auth(format!("credentials file unreadable: {e}")))?;
        Ok(credentials)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::minutes(EXPIRY_MARGIN_MINUTES) < Utc::now(),
            // No expiry recorded: assume stale and refresh up front.
            None => true,
        }
    }

    /// Refresh the access token if it is expired or about to expire.
    pub async fn refresh_if_needed(&mut self, http: &HttpClient) -> Result<()> {
        if !self.is_expired() {
            return Ok(());
        }
        tracing::info!("access token expired or expiring soon, refreshing");
        self.refresh(http).await
    }

    async fn refresh(&mut self, http: &HttpClient) -> Result<()> {
        let client_id = env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| Error::Auth("SPOTIFY_CLIENT_ID is not set".into()))?;
        let client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| Error::Auth("SPOTIFY_CLIENT_SECRET is not set".into()))?;

        let basic = general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"));
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_str()),
        ];

        let response = http
            .post(TOKEN_URL)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token refresh rejected (status {status}): {body}"
            )));
        }

        let json: Value = response.json().await?;

        match json.get("access_token").and_then(|v| v.as_str()) {
            Some(token) => self.access_token = token.to_string(),
            None => return Err(Error::Auth("token response missing access_token".into())),
        }
        // Spotify only returns a new refresh token when it rotates it.
        if let Some(refresh) = json.get("refresh_token").and_then(|v| v.as_str()) {
            self.refresh_token = refresh.to_string();
        }
        if let Some(expires_in) = json.get("expires_in").and_then(|v| v.as_i64()) {
            self.expires_at = Some(Utc::now() + Duration::seconds(expires_in));
        }

        self.save()?;
        tracing::info!("access token refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials_expiring_at(expires_at: Option<DateTime<Utc>>) -> Credentials {
        Credentials {
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_expired_when_no_expiry_recorded() {
        assert!(credentials_expiring_at(None).is_expired());
    }

    #[test]
    fn test_expired_inside_margin() {
        let soon = Utc::now() + Duration::minutes(2);
        assert!(credentials_expiring_at(Some(soon)).is_expired());
    }

    #[test]
    fn test_fresh_outside_margin() {
        let later = Utc::now() + Duration::minutes(30);
        assert!(!credentials_expiring_at(Some(later)).is_expired());
    }

    #[test]
    fn test_serialization_skips_missing_expiry() {
        let json = serde_json::to_string(&credentials_expiring_at(None)).unwrap();
        assert!(!json.contains("expires_at"));

        let parsed: Credentials =
            serde_json::from_str(r#"{"access_token": "a", "refresh_token": "r"}"#).unwrap();
        assert!(parsed.expires_at.is_none());
    }
}
