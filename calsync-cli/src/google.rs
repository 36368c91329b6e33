//! Google Calendar feed client.

use std::sync::Mutex;

use calsync_core::remote::{FeedClient, FeedPage};
use calsync_core::{SyncError, SyncResult};
use url::Url;

use crate::auth::{self, Credentials, Tokens};

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Feed client over the Google Calendar `events.list` endpoint.
///
/// Owns the stored tokens for the length of a run, refreshing them when
/// expired and persisting the refreshed pair.
pub struct GoogleClient {
    http: reqwest::Client,
    creds: Credentials,
    tokens: Mutex<Tokens>,
}

impl GoogleClient {
    pub fn new(creds: Credentials, tokens: Tokens) -> Self {
        GoogleClient {
            http: reqwest::Client::new(),
            creds,
            tokens: Mutex::new(tokens),
        }
    }

    /// A valid access token, refreshed and re-saved when expired.
    ///
    /// A refresh that is rejected means the stored credential is no
    /// longer usable without interactive reauthorization.
    async fn access_token(&self) -> SyncResult<String> {
        let current = self.tokens.lock().unwrap().clone();

        if !current.needs_refresh() {
            return Ok(current.access_token);
        }

        let refreshed = auth::refresh(&self.creds, &current)
            .await
            .map_err(|_| self.auth_required())?;
        refreshed
            .save()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let access = refreshed.access_token.clone();
        *self.tokens.lock().unwrap() = refreshed;
        Ok(access)
    }

    /// The recoverable-auth signal, carrying the consent URL as the
    /// recovery payload.
    fn auth_required(&self) -> SyncError {
        SyncError::AuthRequired {
            recovery: auth::consent_url(&self.creds),
        }
    }
}

impl FeedClient for GoogleClient {
    async fn list_page(&self, calendar_id: &str, page_token: &str) -> SyncResult<FeedPage> {
        let token = self.access_token().await?;

        let mut url = Url::parse(&format!("{}/{}/events", EVENTS_URL, calendar_id))
            .map_err(|e| SyncError::Config(format!("Bad calendar id: {}", e)))?;
        if !page_token.is_empty() {
            url.query_pairs_mut().append_pair("pageToken", page_token);
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SyncError::Feed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(self.auth_required());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Feed(format!("Feed returned {}: {}", status, body)));
        }

        response
            .json::<FeedPage>()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}
