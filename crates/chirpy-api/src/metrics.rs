use std::sync::atomic::Ordering;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::info;

use crate::state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.hits.load(Ordering::Relaxed);
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        hits
    ))
}

pub async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    let previous = state.hits.swap(0, Ordering::Relaxed);
    info!("File server hit counter reset from {}", previous);
    (
        StatusCode::OK,
        format!("Hits count was {}, now reset to 0", previous),
    )
}
