mod config;
mod errors;
mod llm_client;
mod routes;
mod scheduling;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scheduling::rules::SchedulingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cadence API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    // Duration rules are request-invariant; shared read-only via state
    let rules = SchedulingConfig::default();
    info!(
        "Scheduling rules: max {}min continuous work, {}min long breaks",
        rules.max_work_without_break, rules.long_break_duration
    );

    // Build app state
    let state = AppState {
        llm,
        rules,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
