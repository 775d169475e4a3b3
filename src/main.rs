use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

use campus_expenses::auth::StaticAuthenticator;
use campus_expenses::image::{DisabledImageHost, HttpImageHost, ImageHost};
use campus_expenses::store::{ExpenseStore, InMemoryStore};
use campus_expenses::{router, spawn_session_sweeper, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let auth = StaticAuthenticator::from_toml_file(&config.credentials).with_context(|| {
        format!(
            "loading credentials from {}",
            config.credentials.display()
        )
    })?;

    let images: Arc<dyn ImageHost> = match &config.image_upload_url {
        Some(url) => {
            info!(endpoint = %url, "receipt uploads enabled");
            Arc::new(HttpImageHost::new(url.clone(), config.image_upload_preset.clone()))
        }
        None => {
            info!("receipt uploads disabled; expenses will be recorded without images");
            Arc::new(DisabledImageHost)
        }
    };

    let store: Arc<dyn ExpenseStore> = Arc::new(InMemoryStore::new());
    let state = AppState::new(store, images, Arc::new(auth), config.session_ttl());
    let sweeper = spawn_session_sweeper(state.clone(), config.sweep_interval());

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(listen = %config.listen, "serving");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
