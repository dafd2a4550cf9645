//! SoundCloud search proxy - `GET /api/soundcloud/search`

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info, warn};

use crate::models::AppState;
use crate::soundcloud::{normalize, NormalizedTrack};
use crate::types::{AppError, AppResult};

/// Query parameters accepted by the search endpoint.
///
/// `limit` stays a string so a malformed value falls back to the default
/// instead of being rejected by the extractor.
#[derive(Debug, Default, PartialEq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub client_id: Option<String>,
}

impl SearchParams {
    /// Build from raw query pairs. A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "limit" => &mut params.limit,
                "client_id" => &mut params.client_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/soundcloud/search", get(search))
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<Vec<NormalizedTrack>>> {
    let result = match query {
        Ok(Query(pairs)) => search_tracks(&state, SearchParams::from_pairs(pairs)).await,
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    };

    match result {
        Ok(tracks) => Ok(Json(tracks)),
        Err(err) => {
            match &err {
                AppError::BadRequest(message) => warn!("Rejected search request: {}", message),
                AppError::Upstream { status, body } => {
                    error!(status = status.as_u16(), body = %body, "SoundCloud API error")
                }
                AppError::Internal(message) => error!("Proxy error: {}", message),
            }
            Err(err)
        }
    }
}

/// Validate the request, call SoundCloud and normalize the result.
pub async fn search_tracks(
    state: &AppState,
    params: SearchParams,
) -> AppResult<Vec<NormalizedTrack>> {
    let sc = &state.config.soundcloud;

    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter \"q\" is required".to_string()))?;

    let client_id = resolve_client_id(params.client_id.as_deref(), &sc.client_id).ok_or_else(|| {
        AppError::BadRequest(
            "Client ID is required. Set SOUNDCLOUD_CLIENT_ID environment variable or pass it as query parameter"
                .to_string(),
        )
    })?;

    let limit = effective_limit(params.limit.as_deref(), sc.default_limit, sc.max_limit);

    info!(query = %query, limit, "Proxying SoundCloud search");

    let tracks: Vec<NormalizedTrack> = state
        .soundcloud
        .search_tracks(query, limit, client_id)
        .await?
        .into_iter()
        .map(normalize)
        .collect();

    info!(count = tracks.len(), "Found {} tracks", tracks.len());
    Ok(tracks)
}

/// Request override first, then the configured credential. Empty strings count as missing.
pub fn resolve_client_id<'a>(requested: Option<&'a str>, configured: &'a str) -> Option<&'a str> {
    requested
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .or_else(|| Some(configured.trim()).filter(|id| !id.is_empty()))
}

/// `min(requested or default, max)`, where anything but a positive integer means "default".
pub fn effective_limit(requested: Option<&str>, default_limit: u32, max_limit: u32) -> u32 {
    requested
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|&limit| limit > 0)
        .unwrap_or(default_limit)
        .min(max_limit)
}
