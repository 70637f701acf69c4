//! API module - status HTTP handlers and routes

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};

use crate::accessory::StatusPoller;
use crate::host::AccessoryRegistry;

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<AccessoryRegistry>,
    pub poller: Option<Arc<StatusPoller>>,
    started_at: Instant,
}

impl ApiState {
    pub fn new(registry: Arc<AccessoryRegistry>, poller: Option<Arc<StatusPoller>>) -> Self {
        Self {
            registry,
            poller,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Accessories
        .route("/api/accessories", get(handlers::list_accessories))
        .route("/api/accessories/:uuid", get(handlers::get_accessory))
        // Manual refresh
        .route("/api/refresh", post(handlers::refresh_now))
}
