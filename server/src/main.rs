use std::error::Error;

use tokio::net::TcpListener;
use todo_server::{config::Config, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().inspect_err(|e| error!("Invalid configuration: {e}"))?;
    let state = AppState::from_config(&config.store);

    // Requests retry on their own, so a store that is down at boot is not fatal.
    if let Err(e) = state.pool.ensure_connected().await {
        warn!(error = %e, "Store unavailable at startup, will retry on first request");
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    todo_server::run(listener, state).await?;
    Ok(())
}
