use std::net::SocketAddr;
use std::sync::Arc;

use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_consulta_api::config::Config;
use rust_consulta_api::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes tracing, loads the configuration, builds the upstream and
/// webhook clients, then serves the router with per-IP rate limiting on the
/// lookup endpoints.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_consulta_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("🔌 Lookup API: {}", config.lookup_base_url);

    let app_state = Arc::new(
        AppState::from_config(config.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize clients: {}", e))?,
    );

    // Per-IP rate limiting on the lookup endpoints only
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
    );

    let api_routes = handlers::api_routes().layer(GovernorLayer {
        config: governor_conf,
    });

    let app = handlers::finish_router(handlers::public_routes().merge(api_routes), app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("✅ Server listening on {}", addr);

    // Peer address is the rate-limit key when no forwarding headers are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
