/**
 * Health Routes
 * Endpoints for checking backend and storage health
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::storage::KeyValueStore;
use crate::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detailed health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub storage: ServiceCheck,
}

/// Ready check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

async fn check_storage<S: KeyValueStore>(storage: &S) -> ServiceCheck {
    let start = Instant::now();
    match storage.ping().await {
        Ok(()) => ServiceCheck {
            status: "healthy".to_string(),
            backend: storage.backend_name().to_string(),
            response_time: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            backend: storage.backend_name().to_string(),
            response_time: None,
            error: Some(e.to_string()),
        },
    }
}

/// GET /health - Simple health ping
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed - Uptime and storage check
pub async fn health_detailed<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let storage = check_storage(state.content.storage()).await;

    // "ok" while the process serves requests; storage state is reported separately
    let response = DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        storage,
    };

    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check; not ready while storage is unreachable
pub async fn health_ready<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let storage = check_storage(state.content.storage()).await;
    let is_ready = storage.status == "healthy";

    let response = ReadyResponse {
        status: if is_ready {
            "ready".to_string()
        } else {
            "not ready".to_string()
        },
        timestamp: Utc::now(),
        uptime: Some(SERVER_START.elapsed().as_secs()),
        reason: storage.error,
    };

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, json_request, send};
    use crate::stores::testing::FailingStore;
    use crate::stores::LatencyProfile;
    use crate::create_app;

    #[test]
    fn test_service_check_has_required_fields() {
        let check = ServiceCheck {
            status: "healthy".to_string(),
            backend: "memory".to_string(),
            response_time: Some(10),
            error: None,
        };
        let json = serde_json::to_string(&check).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("responseTime"));
    }

    #[tokio::test]
    async fn test_health_ping_returns_ok() {
        init_start_time();
        let (app, _) = app();
        let (status, bytes) = send(&app, json_request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: SimpleHealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_health_detailed_reports_memory_backend() {
        init_start_time();
        let (app, _) = app();
        let (status, bytes) =
            send(&app, json_request("GET", "/health/detailed", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: DetailedHealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ok");
        assert!(body.uptime.is_some());
        assert_eq!(body.storage.backend, "memory");
        assert_eq!(body.storage.status, "healthy");
    }

    #[tokio::test]
    async fn test_health_ready_returns_ready() {
        let (app, _) = app();
        let (status, bytes) = send(&app, json_request("GET", "/health/ready", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: ReadyResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ready");
    }

    #[tokio::test]
    async fn test_health_ready_not_ready_when_storage_down() {
        let app = create_app(AppState::new(FailingStore, LatencyProfile::none()));
        let (status, bytes) = send(&app, json_request("GET", "/health/ready", None, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body: ReadyResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "not ready");
        assert!(body.reason.is_some());
    }
}
