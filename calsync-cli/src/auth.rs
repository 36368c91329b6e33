//! Credential and token storage for the Google feed.
//!
//! Credentials and tokens are stored in:
//!   ~/.config/calsync/credentials.json
//!   ~/.config/calsync/tokens.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const REDIRECT_PORT: u16 = 8085;

/// Tokens are refreshed this long before their recorded expiry.
const REFRESH_LEEWAY_SECS: i64 = 60;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

pub fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("calsync"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("credentials.json");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                {{\n  \
                  \"client_id\": \"your-client-id.apps.googleusercontent.com\",\n  \
                  \"client_secret\": \"your-client-secret\"\n\
                }}\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        let creds: Credentials = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

        Ok(creds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Tokens {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("tokens.json");

        if !path.exists() {
            anyhow::bail!(
                "Not connected to Google Calendar.\n\
                Run `calsync connect` first."
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read tokens from {}", path.display()))?;

        let tokens: Tokens = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tokens from {}", path.display()))?;

        Ok(tokens)
    }

    pub fn save(&self) -> Result<()> {
        let path = base_dir()?.join("tokens.json");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize tokens")?;

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write tokens to {}", path.display()))?;

        Ok(())
    }

    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(REFRESH_LEEWAY_SECS) >= at,
            None => false,
        }
    }
}

/// Consent URL the user opens to (re)authorize access.
pub fn consent_url(creds: &Credentials) -> String {
    // unwrap safe: static URL
    let mut url = Url::parse(AUTH_URL).unwrap();
    url.query_pairs_mut()
        .append_pair("client_id", &creds.client_id)
        .append_pair("redirect_uri", &redirect_uri())
        .append_pair("response_type", "code")
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    url.to_string()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(creds: &Credentials, code: &str) -> Result<Tokens> {
    let redirect = redirect_uri();
    let params = [
        ("code", code),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("redirect_uri", redirect.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let token = post_token_request(&params).await?;

    Ok(Tokens {
        access_token: token.access_token,
        refresh_token: token.refresh_token.unwrap_or_default(),
        expires_at: expires_at(token.expires_in),
    })
}

/// Refresh an expired access token.
pub async fn refresh(creds: &Credentials, tokens: &Tokens) -> Result<Tokens> {
    if tokens.refresh_token.is_empty() {
        anyhow::bail!("No refresh token available");
    }

    let params = [
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("refresh_token", tokens.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let token = post_token_request(&params).await?;

    // Google typically doesn't return a new refresh_token on refresh
    let refresh_token = token
        .refresh_token
        .unwrap_or_else(|| tokens.refresh_token.clone());

    Ok(Tokens {
        access_token: token.access_token,
        refresh_token,
        expires_at: expires_at(token.expires_in),
    })
}

async fn post_token_request(params: &[(&str, &str)]) -> Result<TokenResponse> {
    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .form(params)
        .send()
        .await
        .context("Token request failed")?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Token request rejected: {}", body);
    }

    response
        .json::<TokenResponse>()
        .await
        .context("Failed to parse token response")
}

fn expires_at(expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in > 0 {
        Some(Utc::now() + Duration::seconds(expires_in))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_url_carries_client_and_scope() {
        let creds = Credentials {
            client_id: "client-1".to_string(),
            client_secret: "secret".to_string(),
        };

        let url = Url::parse(&consent_url(&creds)).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("client_id".to_string(), "client-1".to_string())));
        assert!(pairs.contains(&("access_type".to_string(), "offline".to_string())));
        assert!(
            pairs
                .iter()
                .any(|(k, v)| k == "scope" && v.contains("calendar.readonly"))
        );
    }

    #[test]
    fn test_needs_refresh_checks_expiry() {
        let mut tokens = Tokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        assert!(!tokens.needs_refresh());

        tokens.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(tokens.needs_refresh());

        tokens.expires_at = None;
        assert!(!tokens.needs_refresh());
    }
}
