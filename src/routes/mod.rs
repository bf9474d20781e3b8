/**
 * Routes Module
 * API route handlers and the response types they share
 */
pub mod auth;
pub mod comments;
pub mod content;
pub mod health;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            message: None,
        }
    }
}

/// Response for id-addressed moderation and removal.
/// `matched` is false when the id was unknown, which is not an error.
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub matched: bool,
}

/// Log a persistence fault and turn it into a generic error response.
pub(crate) fn storage_failure(
    action: &str,
    err: StorageError,
) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %err, "{}", action);
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(action)))
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use crate::storage::MemoryStore;
    use crate::stores::LatencyProfile;
    use crate::{create_app, AppState};

    /// Full application over a fresh in-memory medium
    pub(crate) fn app() -> (Router, AppState<MemoryStore>) {
        let state = AppState::new(MemoryStore::new(), LatencyProfile::none());
        (create_app(state.clone()), state)
    }

    pub(crate) fn json_request(
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            req = req.header("authorization", value);
        }
        match body {
            Some(json) => req
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        }
    }

    pub(crate) async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }
}
