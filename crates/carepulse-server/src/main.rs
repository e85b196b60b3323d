//! CarePulse server binary.

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use carepulse_core::{connect_backend, Actions, BackendConfig, Config};
use carepulse_server::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    match &config.backend {
        BackendConfig::Appwrite(settings) => {
            info!(endpoint = %settings.endpoint, project = %settings.project_id, "using hosted backend")
        }
        BackendConfig::Local { path } => info!(path = %path.display(), "using local backend"),
    }

    let backend = connect_backend(&config.backend).context("failed to initialize backend")?;
    let actions = Actions::new(backend, config.collections.clone());
    let state = AppState::new(actions, &config.admin_passkey);

    let listener = TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "CarePulse listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
