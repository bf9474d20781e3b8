/**
 * Content Routes
 * Public read of the site copy and admin editing of it
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::models::SiteContent;
use crate::routes::{storage_failure, MutationResponse};
use crate::storage::KeyValueStore;
use crate::AppState;

/// GET /api/content - Current site copy (default document if never edited)
pub async fn get_content<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    match state.content.get_content().await {
        Ok(content) => (StatusCode::OK, Json(content)).into_response(),
        Err(e) => storage_failure("Failed to load content", e).into_response(),
    }
}

/// PUT /api/admin/content - Replace the whole document (auth required)
///
/// The body must carry every field; partial documents are rejected by the
/// JSON extractor before reaching the store.
pub async fn save_content<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
    Json(doc): Json<SiteContent>,
) -> impl IntoResponse {
    match state.content.save_content(&doc).await {
        Ok(()) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => storage_failure("Failed to save content", e).into_response(),
    }
}

/// POST /api/admin/content/case-studies - Append a placeholder case study (auth required)
pub async fn add_case_study<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let mut doc = match state.content.get_content().await {
        Ok(doc) => doc,
        Err(e) => return storage_failure("Failed to load content", e).into_response(),
    };

    let study = doc.add_case_study();

    match state.content.save_content(&doc).await {
        Ok(()) => {
            tracing::info!(case_study_id = %study.id, "case study added");
            (StatusCode::CREATED, Json(study)).into_response()
        }
        Err(e) => storage_failure("Failed to save content", e).into_response(),
    }
}

/// DELETE /api/admin/content/case-studies/{id} - Remove a case study (auth required)
pub async fn remove_case_study<S: KeyValueStore + Clone>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut doc = match state.content.get_content().await {
        Ok(doc) => doc,
        Err(e) => return storage_failure("Failed to load content", e).into_response(),
    };

    let matched = doc.remove_case_study(&id);
    if matched {
        if let Err(e) = state.content.save_content(&doc).await {
            return storage_failure("Failed to save content", e).into_response();
        }
        tracing::info!(case_study_id = %id, "case study removed");
    }

    (
        StatusCode::OK,
        Json(MutationResponse {
            success: true,
            matched,
        }),
    )
        .into_response()
}
