// Socialite server - social networking REST backend

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use socialite::{app_state::AppState, config::Config, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Make sure the database file's directory exists before connecting
    if let Some(path) = config.database.url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    // Build application router
    let app = routes::create_router(app_state);

    let addr = config.server_address();
    info!("Socialite server starting on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
