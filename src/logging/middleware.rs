use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Health probes are polled constantly; keep them out of info-level logs.
fn is_probe(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

/// Log every request and its outcome, tagged with the request id and the
/// matched route template rather than the raw URI.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let req_id: String = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    if is_probe(&route) {
        let response = next.run(request).await;
        tracing::debug!(
            request_id = %req_id,
            route = %route,
            status = %response.status(),
            "health probe"
        );
        return response;
    }

    tracing::info!(
        request_id = %req_id,
        method = %method,
        route = %route,
        "incoming request"
    );

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            request_id = %req_id,
            method = %method,
            route = %route,
            status = %status,
            duration_ms = %duration_ms,
            "request completed with error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            request_id = %req_id,
            method = %method,
            route = %route,
            status = %status,
            duration_ms = %duration_ms,
            "request completed with client error"
        );
    } else {
        tracing::info!(
            request_id = %req_id,
            method = %method,
            route = %route,
            status = %status,
            duration_ms = %duration_ms,
            "request completed successfully"
        );
    }

    response
}

pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, json_request};
    use tower::ServiceExt;

    #[test]
    fn test_is_probe() {
        assert!(is_probe("/health"));
        assert!(is_probe("/health/ready"));
        assert!(!is_probe("/api/comments"));
        assert!(!is_probe("/healthz"));
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let (app, _) = app();
        let res = app
            .oneshot(json_request("GET", "/api/content", None, None))
            .await
            .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }
}
