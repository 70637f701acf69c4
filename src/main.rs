//! compost-bridge - Composter cycle status for smart-home hosts
//!
//! Logs into the composter cloud, picks the configured device by nickname and
//! keeps a sensor accessory's value at the minutes left in the running cycle.

mod accessory;
mod api;
mod cloud;
mod config;
mod error;
mod host;
mod platform;

use std::net::SocketAddr;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiState;
use crate::host::AccessoryRegistry;
use crate::platform::Platform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compost_bridge=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting compost-bridge...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded");

    // In-process host for the sensor accessory
    let registry = Arc::new(AccessoryRegistry::new());

    // Startup failures leave the bridge running without an accessory
    let platform = Platform::new(config.clone(), registry.clone());
    let running = match platform.start().await {
        Ok(Some(accessory)) => {
            tracing::info!(
                "Accessory {} registered for device {}",
                accessory.uuid,
                accessory.poller().device_id()
            );
            Some(accessory)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Startup failed, no accessory created: {}", e);
            None
        }
    };

    let state = ApiState::new(
        registry.clone(),
        running.as_ref().map(|a| a.poller().clone()),
    );

    if config.server.enabled {
        let app = api::routes().with_state(state).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        tracing::info!("Status API listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        shutdown_signal().await;
    }

    if let Some(accessory) = running {
        accessory.shutdown().await;
    }

    tracing::info!("Shutdown complete ({} accessories)", registry.len().await);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
