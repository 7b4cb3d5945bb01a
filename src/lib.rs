use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use std::error::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod render;
pub mod store;

use handler::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handler::index))
        .route("/save", post(handler::save))
        .route("/bookmarks", get(handler::list_bookmarks))
        .route("/health", get(handler::healthcheck))
        .route("/static/*path", get(assets::serve_static))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Flattens an error and its sources into `outer: inner: root`.
pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
