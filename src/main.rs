use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ads_billing_api::ads_client::GoogleAdsRestClient;
use ads_billing_api::app;
use ads_billing_api::config::Config;
use ads_billing_api::handlers::AppState;

/// Main entry point for the billing service.
///
/// Initializes tracing, loads configuration once, builds the Google Ads
/// client and serves the HTTP routes with CORS, tracing and per-IP rate
/// limiting on the billing endpoints.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ads_billing_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let platform = GoogleAdsRestClient::new(&config)?;
    tracing::info!(
        "✓ Google Ads client initialized: {} ({})",
        config.endpoint,
        config.api_version
    );

    let app_state = Arc::new(AppState {
        config: config.clone(),
        platform: Arc::new(platform),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    // Liveness and docs bypass rate limiting
    let api = app::api_routes().layer(GovernorLayer {
        config: governor_conf,
    });
    let router = app::router(app_state, api);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
