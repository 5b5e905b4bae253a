use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use chirpy_types::api::{ChirpQuery, ChirpResponse, CreateChirpRequest};
use chirpy_types::models::ChirpId;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::{AppState, run_blocking};

/// GET /api/chirps[?author_id=N]
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let chirps = run_blocking(&state, move |s| match query.author_id {
        Some(author_id) => s.db.list_chirps_by_author(author_id),
        None => s.db.list_chirps(),
    })
    .await?;

    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect::<Vec<_>>()))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<ChirpId>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = run_blocking(&state, move |s| s.db.get_chirp(chirp_id)).await?;
    Ok(Json(ChirpResponse::from(chirp)))
}

/// POST /api/chirps
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(author_id)): Extension<AuthUser>,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = run_blocking(&state, move |s| s.db.create_chirp(author_id, &req.body)).await?;
    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

/// DELETE /api/chirps/{chirp_id}
pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<ChirpId>,
    Extension(AuthUser(author_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(&state, move |s| s.db.delete_chirp_by_author(chirp_id, author_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
