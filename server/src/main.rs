//! Archive Gate Server - Main Entry Point

use anyhow::{Context, Result};
use tracing::info;

use archive_server::{api, config, directory::HttpDirectoryClient, ratelimit};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archive_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Archive Gate Server"
    );

    let directory = HttpDirectoryClient::new(&config.upstream_api_base, config.upstream_timeout)
        .context("Failed to build upstream HTTP client")?;
    info!(base = %config.upstream_api_base, "Upstream directory configured");

    let rl_config = ratelimit::RateLimitConfig::from_env();
    if rl_config.enabled {
        info!(
            path = %rl_config.log_path.display(),
            requests = rl_config.refresh.requests,
            window_secs = rl_config.refresh.window_secs,
            "Refresh rate limiter initialized"
        );
    } else {
        info!("Rate limiting disabled by configuration");
    }
    let rate_limiter = ratelimit::RateLimiter::new(rl_config);

    // Build application state
    let state = api::AppState::new(config.clone(), directory, rate_limiter);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
