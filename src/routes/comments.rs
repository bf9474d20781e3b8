/**
 * Comment Routes
 * Visitor submissions and admin moderation
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{pending_count, visible_to_visitors, Comment, ModerationDecision};
use crate::routes::{storage_failure, ErrorResponse, MutationResponse};
use crate::storage::KeyValueStore;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/comments
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCommentRequest {
    pub author: String,
    pub content: String,
}

/// Response for GET /api/comments
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub items: Vec<Comment>,
    pub total: usize,
}

/// Response for GET /api/admin/comments
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCommentListResponse {
    pub items: Vec<Comment>,
    pub total: usize,
    pub pending_count: usize,
}

/// Request body for PATCH /api/admin/comments/{id}
#[derive(Debug, Deserialize, Serialize)]
pub struct ModerateCommentRequest {
    pub status: ModerationDecision,
}

// ============================================================================
// Validation
// ============================================================================

const MAX_AUTHOR_CHARS: usize = 80;
const MAX_CONTENT_CHARS: usize = 2000;

/// Strip all markup from visitor text; script and style bodies are dropped too.
/// The result is plain text, not HTML.
fn sanitize_text(text: &str) -> String {
    let mut builder = ammonia::Builder::empty();
    builder.clean_content_tags(["script", "style"].into_iter().collect());
    unescape_text(&builder.clean(text).to_string())
}

/// Undo the entity escaping ammonia applies when serializing text nodes.
/// `&amp;` goes last so an escaped ampersand is not decoded twice.
fn unescape_text(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Trim, bound and sanitize a visitor submission.
fn validate_submission(
    payload: &CreateCommentRequest,
) -> Result<(String, String), (StatusCode, Json<ErrorResponse>)> {
    let author = payload.author.trim();
    let content = payload.content.trim();

    if author.is_empty() || content.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Author and content are required")),
        ));
    }

    if author.chars().count() > MAX_AUTHOR_CHARS || content.chars().count() > MAX_CONTENT_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Comment too long".to_string(),
                message: Some(format!(
                    "Author is limited to {} characters and content to {}",
                    MAX_AUTHOR_CHARS, MAX_CONTENT_CHARS
                )),
            }),
        ));
    }

    let author = sanitize_text(author);
    let content = sanitize_text(content);
    if author.trim().is_empty() || content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Author and content are required")),
        ));
    }

    Ok((author, content))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/comments - Approved comments, newest first
pub async fn list_public_comments<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    match state.comments.list_comments().await {
        Ok(all) => {
            let items = visible_to_visitors(&all);
            let total = items.len();
            (StatusCode::OK, Json(CommentListResponse { items, total })).into_response()
        }
        Err(e) => storage_failure("Failed to load comments", e).into_response(),
    }
}

/// POST /api/comments - Visitor submission, held for moderation
pub async fn create_comment<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
    Json(payload): Json<CreateCommentRequest>,
) -> impl IntoResponse {
    let (author, content) = match validate_submission(&payload) {
        Ok(fields) => fields,
        Err(err_response) => return err_response.into_response(),
    };

    match state.comments.add_comment(&author, &content).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => storage_failure("Failed to submit comment", e).into_response(),
    }
}

/// GET /api/admin/comments - Every comment plus the pending badge count (auth required)
pub async fn list_all_comments<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    match state.comments.list_comments().await {
        Ok(items) => {
            let response = AdminCommentListResponse {
                total: items.len(),
                pending_count: pending_count(&items),
                items,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => storage_failure("Failed to load comments", e).into_response(),
    }
}

/// PATCH /api/admin/comments/{id} - Approve or reject (auth required)
pub async fn moderate_comment<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(payload): Json<ModerateCommentRequest>,
) -> impl IntoResponse {
    match state.comments.set_comment_status(&id, payload.status).await {
        Ok(matched) => (
            StatusCode::OK,
            Json(MutationResponse {
                success: true,
                matched,
            }),
        )
            .into_response(),
        Err(e) => storage_failure("Failed to update comment", e).into_response(),
    }
}

/// DELETE /api/admin/comments/{id} - Hard delete (auth required)
pub async fn delete_comment<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.comments.delete_comment(&id).await {
        Ok(matched) => (
            StatusCode::OK,
            Json(MutationResponse {
                success: true,
                matched,
            }),
        )
            .into_response(),
        Err(e) => storage_failure("Failed to delete comment", e).into_response(),
    }
}
