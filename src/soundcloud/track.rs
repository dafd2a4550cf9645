//! Upstream track shape and the normalization into the public track record.
//!
//! The upstream schema is not under our control, so every field is optional and
//! a value of the wrong JSON type is read as absent instead of failing the
//! whole response. Empty strings are treated as absent too.

use chrono::{SecondsFormat, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SOURCE_TAG: &str = "soundcloud";
pub const PERMALINK_BASE: &str = "https://soundcloud.com";

const UNTITLED: &str = "Untitled";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Track object as returned inside the upstream `collection` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamTrack {
    /// Numeric on SoundCloud, but accept strings as well.
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artwork_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<UpstreamUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub playback_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stream_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub permalink_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamUser {
    #[serde(default, deserialize_with = "lenient")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub permalink: Option<String>,
}

/// Top-level upstream search response.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamSearchResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub collection: Option<Vec<Value>>,
}

impl UpstreamSearchResponse {
    /// Parse each collection element, treating anything unreadable as an empty track.
    pub fn into_tracks(self) -> Vec<UpstreamTrack> {
        self.collection
            .unwrap_or_default()
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()
    }
}

/// Stable track record returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrack {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub channel_title: String,
    pub duration: u64,
    pub view_count: u64,
    pub published_at: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    pub permalink_url: String,
}

impl From<UpstreamTrack> for NormalizedTrack {
    fn from(track: UpstreamTrack) -> Self {
        normalize(track)
    }
}

/// Map an upstream track to a [`NormalizedTrack`], filling every missing field with its default.
pub fn normalize(track: UpstreamTrack) -> NormalizedTrack {
    let user = track.user.unwrap_or_default();
    let permalink_url = non_empty(track.permalink_url);

    let id = track
        .id
        .as_ref()
        .and_then(id_to_string)
        .or_else(|| permalink_url.clone())
        .unwrap_or_else(generate_fallback_id);

    let permalink_url = permalink_url.unwrap_or_else(|| {
        build_permalink(
            non_empty(user.permalink.clone()).as_deref(),
            non_empty(track.permalink).as_deref(),
        )
    });

    NormalizedTrack {
        id,
        title: non_empty(track.title).unwrap_or_else(|| UNTITLED.to_string()),
        description: non_empty(track.description).unwrap_or_default(),
        thumbnail: non_empty(track.artwork_url)
            .or_else(|| non_empty(user.avatar_url))
            .unwrap_or_default(),
        channel_title: non_empty(user.username)
            .or_else(|| non_empty(user.full_name))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        duration: to_count(track.duration),
        view_count: to_count(track.playback_count),
        published_at: non_empty(track.created_at).unwrap_or_else(now_iso8601),
        source: SOURCE_TAG.to_string(),
        stream_url: non_empty(track.stream_url),
        permalink_url,
    }
}

/// Construct a permalink from the uploader and track slugs.
///
/// Both slugs give the track page, the uploader slug alone gives the uploader's
/// profile, and anything else yields an empty string.
pub fn build_permalink(user_slug: Option<&str>, track_slug: Option<&str>) -> String {
    match (user_slug, track_slug) {
        (Some(user), Some(track)) => format!("{PERMALINK_BASE}/{user}/{track}"),
        (Some(user), None) => format!("{PERMALINK_BASE}/{user}"),
        _ => String::new(),
    }
}

/// `sc_<unix-millis>_<random>`
pub fn generate_fallback_id() -> String {
    format!(
        "sc_{}_{:016x}",
        Utc::now().timestamp_millis(),
        rand::random::<u64>()
    )
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// Negative, NaN and missing values all become zero.
fn to_count(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
