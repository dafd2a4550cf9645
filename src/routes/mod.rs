//! API Routes
//!
//! - `/api/soundcloud/search` - SoundCloud search proxy
//! - `/health` - Health check

pub mod health;
pub mod search;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the application router with CORS and request tracing applied.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = state.config.cors.clone();

    let router = Router::new()
        .merge(search::router(state.clone()))
        .merge(health::router(state));

    apply_cors(router, &cors).layer(TraceLayer::new_for_http())
}
