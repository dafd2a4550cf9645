use std::sync::Arc;

use crate::config::Config;
use crate::soundcloud::{SoundCloudClient, SoundCloudError};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub soundcloud: SoundCloudClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, SoundCloudError> {
        let soundcloud = SoundCloudClient::from_config(&config.soundcloud)?;
        Ok(Self {
            config: Arc::new(config),
            soundcloud,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
