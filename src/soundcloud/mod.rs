//! SoundCloud Module
//!
//! - `client` - outbound calls to the SoundCloud `api-v2` search endpoint
//! - `track` - loose upstream track shape and normalization into [`NormalizedTrack`]

pub mod client;
pub mod track;

pub use client::{SoundCloudClient, SoundCloudError};
pub use track::{normalize, NormalizedTrack, UpstreamTrack};
