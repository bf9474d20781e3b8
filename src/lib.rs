//! PrediMaint site backend - library for app logic and testing

pub mod db;
pub mod logging;
pub mod models;
pub mod routes;
pub mod storage;
pub mod stores;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use storage::{KeyValueStore, MemoryStore, PgStore};
use stores::{CommentStore, ContentStore, LatencyProfile};

/// Shared handler state: both stores over one storage medium.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    pub content: ContentStore<S>,
    pub comments: CommentStore<S>,
}

impl<S: KeyValueStore + Clone> AppState<S> {
    pub fn new(storage: S, latency: LatencyProfile) -> Self {
        Self {
            content: ContentStore::new(storage.clone(), latency),
            comments: CommentStore::new(storage, latency),
        }
    }
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local frontend dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app<S: KeyValueStore + Clone>(state: AppState<S>) -> Router {
    let cors = configure_cors();
    tracing::info!(
        backend = state.content.storage().backend_name(),
        "CORS configured"
    );

    // Auth runs as a route layer so it rejects before any body is parsed.
    let admin = Router::new()
        .route("/api/admin/content", put(routes::content::save_content::<S>))
        .route(
            "/api/admin/content/case-studies",
            post(routes::content::add_case_study::<S>),
        )
        .route(
            "/api/admin/content/case-studies/{id}",
            delete(routes::content::remove_case_study::<S>),
        )
        .route(
            "/api/admin/comments",
            get(routes::comments::list_all_comments::<S>),
        )
        .route(
            "/api/admin/comments/{id}",
            patch(routes::comments::moderate_comment::<S>)
                .delete(routes::comments::delete_comment::<S>),
        )
        .route_layer(middleware::from_fn(routes::auth::admin_guard));

    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route("/api/content", get(routes::content::get_content::<S>))
        .route(
            "/api/comments",
            get(routes::comments::list_public_comments::<S>)
                .post(routes::comments::create_comment::<S>),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed::<S>))
        .route("/health/ready", get(routes::health::health_ready::<S>))
        .merge(admin)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards must live until shutdown or buffered log lines are lost.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    // Refuse to start in production with the insecure default JWT secret.
    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == routes::auth::DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }

        let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_default();
        let admin_password_set =
            std::env::var("ADMIN_HASH_PASSWORD").is_ok() || std::env::var("ADMIN_PASSWORD").is_ok();

        if admin_email.is_empty() || admin_email == "admin@example.com" {
            tracing::warn!(
                "SECURITY: ADMIN_EMAIL is using an insecure default. \
                 Set ADMIN_EMAIL env var to a real address."
            );
        }
        if !admin_password_set {
            tracing::warn!(
                "SECURITY: Neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set. \
                 The fallback default password 'admin123' is insecure. \
                 Set ADMIN_HASH_PASSWORD to a bcrypt hash of a strong password."
            );
        }
    }

    let latency = LatencyProfile::default();
    if latency != LatencyProfile::none() {
        tracing::info!("Simulated storage latency enabled");
    }

    // Bind address is configurable via HOST / PORT env vars.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("Starting server on {}", addr);

    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            Ok(pool) => match db::run_migrations(&pool).await {
                Ok(()) => {
                    let state = AppState::new(PgStore::new(pool), latency);
                    return serve(listener, create_app(state)).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to run database migrations: {}. Falling back to in-memory storage.",
                        e
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Falling back to in-memory storage.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Using in-memory storage; edits are lost on restart.");
    }

    let state = AppState::new(MemoryStore::new(), latency);
    serve(listener, create_app(state)).await;
}

async fn serve(listener: tokio::net::TcpListener, app: Router) {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_app_returns_router() {
        let _app = create_app(AppState::new(MemoryStore::new(), LatencyProfile::none()));
    }

    #[tokio::test]
    async fn test_state_stores_share_one_medium() {
        let memory = MemoryStore::new();
        let state = AppState::new(memory.clone(), LatencyProfile::none());

        state.content.get_content().await.unwrap();
        state.comments.add_comment("A", "hi").await.unwrap();
        state
            .content
            .save_content(&models::SiteContent::default())
            .await
            .unwrap();

        assert_eq!(memory.len().await, 2);
    }
}
