//! Status API handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::ApiState;
use crate::accessory::presentation::minutes_remaining;
use crate::accessory::RefreshOutcome;
use crate::cloud::DeviceEntry;
use crate::error::BridgeError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub accessories: usize,
    pub polling: bool,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub outcome: &'static str,
    pub minutes_remaining: Option<i64>,
    pub entry: Option<DeviceEntry>,
}

/// GET /health - Liveness and accessory count
pub async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        accessories: state.registry.len().await,
        polling: state.poller.is_some(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// GET /api/accessories - All registered accessories
pub async fn list_accessories(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.registry.list().await)
}

/// GET /api/accessories/:uuid - One accessory
pub async fn get_accessory(
    State(state): State<ApiState>,
    Path(uuid): Path<Uuid>,
) -> Result<impl IntoResponse, BridgeError> {
    let sensor = state
        .registry
        .get(&uuid)
        .await
        .ok_or_else(|| BridgeError::NotFound(format!("accessory {}", uuid)))?;

    Ok(Json(sensor.snapshot()))
}

/// POST /api/refresh - Run one refresh now (skipped if one is already running)
pub async fn refresh_now(State(state): State<ApiState>) -> Result<impl IntoResponse, BridgeError> {
    let poller = state
        .poller
        .as_ref()
        .ok_or_else(|| BridgeError::NotFound("no accessory is being polled".to_string()))?;

    let response = match poller.refresh().await {
        RefreshOutcome::Updated(entry) => RefreshResponse {
            outcome: "updated",
            minutes_remaining: Some(minutes_remaining(entry.cycle_time_remaining())),
            entry: Some(entry),
        },
        RefreshOutcome::Unavailable => RefreshResponse {
            outcome: "unavailable",
            minutes_remaining: None,
            entry: poller.cached().await,
        },
        RefreshOutcome::Skipped => RefreshResponse {
            outcome: "skipped",
            minutes_remaining: None,
            entry: None,
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::{routes, ApiState};
    use crate::host::{AccessoryHost, AccessoryRegistry};

    async fn get_json(state: ApiState, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = routes()
            .with_state(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_without_accessory() {
        let state = ApiState::new(Arc::new(AccessoryRegistry::new()), None);
        let (status, body) = get_json(state, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["accessories"], 0);
        assert_eq!(body["polling"], false);
    }

    #[tokio::test]
    async fn test_list_and_get_accessory() {
        let registry = Arc::new(AccessoryRegistry::new());
        let uuid = uuid::Uuid::new_v4();
        registry.get_or_create_sensor(uuid, "Kitchen").await.set_value(4);
        let state = ApiState::new(registry, None);

        let (status, body) = get_json(state.clone(), "/api/accessories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["display_name"], "Kitchen");
        assert_eq!(body[0]["value"], 4);

        let (status, body) = get_json(state.clone(), &format!("/api/accessories/{}", uuid)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uuid"], uuid.to_string());

        let missing = uuid::Uuid::new_v4();
        let (status, body) = get_json(state, &format!("/api/accessories/{}", missing)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_refresh_without_poller_is_not_found() {
        let state = ApiState::new(Arc::new(AccessoryRegistry::new()), None);
        let resp = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
