//! SoundCloud API client
//!
//! Issues a single `GET {api_base_url}/search/tracks` per search and returns the
//! parsed upstream tracks. No retries; a failure is reported to the caller as-is.

use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use super::track::{UpstreamSearchResponse, UpstreamTrack};
use crate::config::SoundCloudConfig;

/// Errors that can occur while talking to the SoundCloud API
#[derive(Debug, Error)]
pub enum SoundCloudError {
    #[error("SoundCloud API error: {status}")]
    Api { status: StatusCode, body: String },

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

/// Thin wrapper around a pooled [`reqwest::Client`].
#[derive(Clone)]
pub struct SoundCloudClient {
    client: Client,
    api_base_url: String,
}

impl SoundCloudClient {
    /// Build a client using the configured base URL, user agent and optional timeout.
    pub fn from_config(config: &SoundCloudConfig) -> Result<Self, SoundCloudError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search tracks. `limit` is sent as-is; clamping is the caller's job.
    pub async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        client_id: &str,
    ) -> Result<Vec<UpstreamTrack>, SoundCloudError> {
        let url = format!("{}/search/tracks", self.api_base_url);
        let limit = limit.to_string();

        debug!(url = %url, limit = %limit, "Calling SoundCloud search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str()), ("client_id", client_id)])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(SoundCloudError::Api { status, body });
        }

        let body = response.text().await?;
        let parsed: UpstreamSearchResponse = serde_json::from_str(&body)?;

        Ok(parsed.into_tracks())
    }
}
