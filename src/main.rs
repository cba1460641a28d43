use tracing_subscriber::EnvFilter;

use coach_admin::config::config;
use coach_admin::server::{serve, shutdown_signal};
use coach_admin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up BACKEND_BASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coach_admin=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Coach Admin in {:?} mode", config.environment);
    config.validate()?;

    let state = AppState::from_config(config.clone())?;

    let bind_addr = format!("{}:{}", config.server.bind_host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    serve(listener, state, shutdown_signal()).await
}
