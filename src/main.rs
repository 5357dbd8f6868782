use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use urinalysis_core::{AppConfig, HttpAnalysisClient};
use urinalysis_web::{router, AppState};

/// Main entry point for the urinalysis test platform
///
/// Resolves configuration once, builds the analysis client and serves the web front end.
///
/// # Environment Variables
/// - `URINALYSIS_ADDR`: server address (default: "0.0.0.0:3000")
/// - `URINALYSIS_API_URL`: analysis endpoint (default: the Knoxxi urinalysis API)
/// - `URINALYSIS_REQUEST_TIMEOUT_SECS`: timeout for the analysis request (default: 60)
/// - `URINALYSIS_DETAIL_DISPLAY`: `inline` or `modal` (default: "inline")
/// - `URINALYSIS_SESSION_IDLE_MINUTES`: idle time before a session is discarded (default: 60)
/// - `URINALYSIS_MAX_UPLOAD_MB`: largest accepted upload (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the page template or HTTP client cannot be built, or
/// - the server address cannot be bound or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("urinalysis_run=info".parse()?)
                .add_directive("urinalysis_core=info".parse()?)
                .add_directive("urinalysis_web=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env_values(
        env("URINALYSIS_ADDR"),
        env("URINALYSIS_API_URL"),
        env("URINALYSIS_REQUEST_TIMEOUT_SECS"),
        env("URINALYSIS_DETAIL_DISPLAY"),
        env("URINALYSIS_SESSION_IDLE_MINUTES"),
        env("URINALYSIS_MAX_UPLOAD_MB"),
    )?;

    let client = HttpAnalysisClient::new(&cfg)?;
    tracing::info!("++ Analysis API at {}", client.url());
    tracing::info!("++ Detail display: {}", cfg.detail_display());

    let state = AppState::new(&cfg, Arc::new(client))?;
    let app = router(state, &cfg);

    tracing::info!("++ Starting urinalysis web on {}", cfg.bind_addr());
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
