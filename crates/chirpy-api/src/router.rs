use std::path::Path;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{count_hits, require_auth};
use crate::state::AppState;
use crate::{auth, chirps, metrics};

/// The complete HTTP surface. `fileserver_root` is served under `/app`.
pub fn router(state: AppState, fileserver_root: &Path) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(metrics::healthz))
        .route("/api/users", post(auth::create_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/{chirp_id}", get(chirps::get_chirp))
        .route("/admin/metrics", get(metrics::metrics))
        .route("/api/reset", post(metrics::reset));

    let protected_routes = Router::new()
        .route("/api/users", put(auth::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(chirps::delete_chirp))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let app_routes = Router::new()
        .nest_service("/app", ServeDir::new(fileserver_root))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(app_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
