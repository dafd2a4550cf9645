use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use soundcloud_proxy::{config::{mask_secret, Config}, routes::create_router, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    config.warn_if_unconfigured();
    info!("Configuration loaded: {:?}", config.server);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST {}: {}", config.server.host, e))?;
    let addr = SocketAddr::new(host, config.server.port);

    info!("{} v{}", config.server.name, config.server.version);
    info!("Running on {}", addr);
    info!("Proxy endpoint: /api/soundcloud/search");
    info!("Environment: {}", config.server.environment);
    info!("SoundCloud Client ID: {}", mask_secret(&config.soundcloud.client_id));

    let state = AppState::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to build SoundCloud client: {}", e))?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
