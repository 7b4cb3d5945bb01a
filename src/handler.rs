use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::Html,
};

use crate::api::{HealthResponse, SaveResponse};
use crate::error::HandlerError;
use crate::model::Collection;
use crate::render;
use crate::store::BookmarkStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookmarkStore>,
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, HandlerError> {
    let bookmarks = state.store.load().await.map_err(|e| {
        tracing::error!(error = %crate::unpack_error(&e), path = %e.path().display(), "failed to load bookmarks for index");
        e
    })?;

    let page = render::render(render::INDEX, &bookmarks).map_err(|e| {
        tracing::error!(error = %crate::unpack_error(&e), template = render::INDEX, "failed to render index");
        e
    })?;

    Ok(Html(page))
}

pub async fn list_bookmarks(State(state): State<AppState>) -> Result<Json<Collection>, HandlerError> {
    let bookmarks = state.store.load().await.map_err(|e| {
        tracing::error!(error = %crate::unpack_error(&e), path = %e.path().display(), "failed to load bookmarks");
        e
    })?;

    Ok(Json(bookmarks))
}

/// Replaces the whole collection with the request body.
///
/// The body is decoded by hand rather than through `Json` so clients that do
/// not send a JSON content type are still accepted.
pub async fn save(State(state): State<AppState>, body: Bytes) -> Result<Json<SaveResponse>, HandlerError> {
    let bookmarks: Collection = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "rejected save request body");
        HandlerError::Request(e)
    })?;

    state.store.save(&bookmarks).await.map_err(|e| {
        tracing::error!(error = %crate::unpack_error(&e), path = %e.path().display(), "failed to save bookmarks");
        e
    })?;

    tracing::info!(count = bookmarks.len(), path = %state.store.path().display(), "bookmarks saved");
    Ok(Json(SaveResponse::saved()))
}
