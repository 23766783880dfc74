use std::future::IntoFuture;

use anyhow::Context;
use tokio::task::JoinError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use torc_controller::config::ControllerSettings;
use torc_controller::worker::{StateExpiry, StateSync};
use torc_controller::{api, bootstrap, load_cluster_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torc_controller=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Torc Controller...");

    let settings = ControllerSettings::from_env()?;
    settings.validate()?;

    tracing::info!("Loading configuration from {}", settings.config_file.display());

    let config = load_cluster_config(&settings)?;

    tracing::info!(
        "Controller {} managing {} node(s)",
        config.name,
        config.nodes.len()
    );

    let state = bootstrap(&settings, config).await?;

    // Background loops
    let sync_handle = StateSync::new(state.clone()).spawn();
    let expiry_handle = StateExpiry::new(state.clone()).spawn();

    let app = api::create_router(state);

    tracing::info!("Listening on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;

    let server = axum::serve(listener, app).into_future();

    // Exit when the server or either loop stops
    tokio::select! {
        result = server => result.context("Failed to start server")?,
        result = sync_handle => worker_stopped("State sync", result)?,
        result = expiry_handle => worker_stopped("State expiry", result)?,
    }

    Ok(())
}

fn worker_stopped(name: &str, result: Result<(), JoinError>) -> anyhow::Result<()> {
    match result {
        Ok(()) => anyhow::bail!("{} loop exited", name),
        Err(err) => {
            tracing::error!("{} loop died: {}", name, err);
            Err(err).with_context(|| format!("{} loop died", name))
        }
    }
}
