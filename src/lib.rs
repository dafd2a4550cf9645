// SoundCloud Proxy - search SoundCloud and return a normalized track list

pub mod config;
pub mod models;
pub mod types;
pub mod soundcloud;  // Upstream client and track normalization
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
