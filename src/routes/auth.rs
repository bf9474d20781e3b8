/**
 * Authentication Routes
 * JWT-based admin login and token verification
 */
use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;

use crate::routes::ErrorResponse;

// ============================================================================
// Configuration
// ============================================================================

/// Development fallback; `run` refuses to start in production with it.
pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

lazy_static::lazy_static! {
    /// JWT secret key from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

    /// Admin email from environment
    pub static ref ADMIN_EMAIL: String = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());

    /// Admin password hash from environment (or plain password to hash)
    pub static ref ADMIN_PASSWORD_HASH: String = {
        if let Ok(hash) = std::env::var("ADMIN_HASH_PASSWORD") {
            hash
        } else if let Ok(plain) = std::env::var("ADMIN_PASSWORD") {
            hash(&plain, DEFAULT_COST).unwrap_or_default()
        } else {
            // Default password "admin123" hashed
            hash("admin123", DEFAULT_COST).unwrap_or_default()
        }
    };

    /// Login attempts per IP: (window start, attempts in window)
    static ref LOGIN_ATTEMPTS: Arc<RwLock<HashMap<String, (i64, u32)>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Access token expiry in minutes
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Login attempts allowed per IP within one window
const LOGIN_ATTEMPTS_PER_WINDOW: u32 = 5;

/// Rate limit window in seconds
const RATE_LIMIT_WINDOW_SECS: i64 = 60;

const ADMIN_USER_ID: &str = "admin";
const ADMIN_ROLE: &str = "admin";

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

/// User info returned to frontend
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<UserInfo>,
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(error: &str) -> Self {
        Self {
            success: false,
            user: None,
            access_token: None,
            expires_in: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create access token
pub(crate) fn create_access_token(
    user_id: &str,
    email: &str,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Gate for admin routes: a valid access token carrying the admin role.
pub fn require_admin(headers: &HeaderMap) -> Result<Claims, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(headers).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Authorization required")),
        )
    })?;

    let claims = verify_access_token(&token).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Invalid or expired token")),
        )
    })?;

    if claims.role != ADMIN_ROLE {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Admin role required")),
        ));
    }

    Ok(claims)
}

/// Middleware for the admin router. The verified claims are left in the
/// request extensions for handlers that want them.
pub async fn admin_guard(mut request: Request, next: Next) -> Response {
    match require_admin(request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err_response) => err_response.into_response(),
    }
}

/// Count a login attempt for `ip`; false once the window's allowance is spent.
///
/// Expired windows are evicted on every call so the map only holds active IPs.
async fn check_rate_limit(ip: &str) -> bool {
    let now = Utc::now().timestamp();
    let mut attempts = LOGIN_ATTEMPTS.write().await;

    attempts.retain(|_, (start, _)| now - *start < RATE_LIMIT_WINDOW_SECS);

    let entry = attempts.entry(ip.to_string()).or_insert((now, 0));
    if entry.1 >= LOGIN_ATTEMPTS_PER_WINDOW {
        return false;
    }
    entry.1 += 1;
    true
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Exchange admin credentials for an access token
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let ip = addr.ip().to_string();

    if !check_rate_limit(&ip).await {
        tracing::warn!(ip = %ip, "login rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(LoginResponse::failure(
                "Too many requests. Please try again later.",
            )),
        );
    }

    if payload.email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Email and password are required")),
        );
    }

    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Invalid email format")),
        );
    }

    let email_matches = payload.email.eq_ignore_ascii_case(ADMIN_EMAIL.as_str());

    // bcrypt is CPU-bound; keep it off the async executor. Verify even on an
    // email mismatch so both failure paths take the same time.
    let password = payload.password;
    let password_ok =
        match tokio::task::spawn_blocking(move || verify(&password, ADMIN_PASSWORD_HASH.as_str()))
            .await
        {
            Ok(Ok(ok)) => ok,
            Ok(Err(e)) => {
                tracing::error!("Failed to verify password hash: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(LoginResponse::failure("Failed to process password")),
                );
            }
        };

    if !(email_matches && password_ok) {
        tracing::warn!(ip = %ip, "failed admin login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid email or password")),
        );
    }

    let access_token = match create_access_token(ADMIN_USER_ID, &ADMIN_EMAIL, ADMIN_ROLE) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Failed to create token")),
            );
        }
    };

    tracing::info!("Successful admin login for: {}", ADMIN_EMAIL.as_str());

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            user: Some(UserInfo {
                user_id: ADMIN_USER_ID.to_string(),
                email: ADMIN_EMAIL.clone(),
                role: ADMIN_ROLE.to_string(),
            }),
            access_token: Some(access_token),
            expires_in: Some(ACCESS_TOKEN_EXPIRY_MINUTES * 60),
            error: None,
        }),
    )
}

/// POST /api/auth/verify
/// Verify access token and return user info
pub async fn verify_token(headers: HeaderMap) -> impl IntoResponse {
    let token = match extract_bearer_token(&headers) {
        Some(t) => t,
        None => {
            return (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: false,
                    is_valid: false,
                    user: None,
                    error: Some("No authorization token provided".to_string()),
                }),
            );
        }
    };

    match verify_access_token(&token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                success: true,
                is_valid: true,
                user: Some(UserInfo {
                    user_id: claims.sub,
                    email: claims.email,
                    role: claims.role,
                }),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: false,
                    is_valid: false,
                    user: None,
                    error: Some("Invalid or expired token".to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    /// Bearer header value for a freshly issued admin token
    pub(crate) fn admin_bearer() -> String {
        let token = create_access_token(ADMIN_USER_ID, "admin@example.com", ADMIN_ROLE).unwrap();
        format!("Bearer {}", token)
    }

    fn auth_router(client_octet: u8) -> Router {
        use axum::extract::connect_info::MockConnectInfo;
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/verify", post(verify_token))
            .layer(MockConnectInfo(SocketAddr::from((
                [10, 0, 0, client_octet],
                12345,
            ))))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &impl serde::Serialize,
    ) -> (StatusCode, axum::body::Bytes) {
        let body = Body::from(serde_json::to_vec(json).unwrap());
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    async fn post_with_header(
        app: Router,
        uri: &str,
        authorization: Option<&str>,
    ) -> (StatusCode, axum::body::Bytes) {
        let mut req = Request::post(uri);
        if let Some(value) = authorization {
            req = req.header("authorization", value);
        }
        let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    #[test]
    fn test_verify_access_token_invalid_returns_err() {
        assert!(verify_access_token("invalid.jwt.token").is_err());
    }

    #[test]
    fn test_require_admin_checks_header_and_role() {
        let mut headers = HeaderMap::new();
        let (status, _) = require_admin(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        headers.insert("authorization", "Bearer garbage".parse().unwrap());
        let (status, _) = require_admin(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let viewer = create_access_token("u1", "viewer@example.com", "viewer").unwrap();
        headers.insert(
            "authorization",
            format!("Bearer {}", viewer).parse().unwrap(),
        );
        let (status, _) = require_admin(&headers).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);

        headers.insert("authorization", admin_bearer().parse().unwrap());
        assert_eq!(require_admin(&headers).unwrap().role, ADMIN_ROLE);
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(1),
            "/api/auth/login",
            &LoginRequest {
                email: "".to_string(),
                password: "admin123".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_invalid_email_format_returns_bad_request() {
        let (status, _) = post_json(
            auth_router(2),
            "/api/auth/login",
            &LoginRequest {
                email: "no-at-sign".to_string(),
                password: "admin123".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let (status, _) = post_json(
            auth_router(3),
            "/api/auth/login",
            &LoginRequest {
                email: "someone@else.com".to_string(),
                password: "wrongpassword".to_string(),
            },
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_rate_limited_after_allowance() {
        let request = LoginRequest {
            email: "".to_string(),
            password: "".to_string(),
        };
        for _ in 0..LOGIN_ATTEMPTS_PER_WINDOW {
            let (status, _) = post_json(auth_router(4), "/api/auth/login", &request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (status, _) = post_json(auth_router(4), "/api/auth/login", &request).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_verify_no_token_returns_error_in_body() {
        let (status, bytes) = post_with_header(auth_router(5), "/api/auth/verify", None).await;
        assert_eq!(status, StatusCode::OK);
        let body: VerifyResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert!(!body.is_valid);
    }

    #[tokio::test]
    async fn test_verify_valid_token_returns_user() {
        let bearer = admin_bearer();
        let (status, bytes) =
            post_with_header(auth_router(6), "/api/auth/verify", Some(&bearer)).await;
        assert_eq!(status, StatusCode::OK);
        let body: VerifyResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.is_valid);
        assert_eq!(body.user.unwrap().role, ADMIN_ROLE);
    }
}
