use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use chirpy_auth::TokenIssuer;
use chirpy_db::Database;
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
    /// Requests served under `/app`.
    pub hits: AtomicU64,
}

impl AppStateInner {
    pub fn new(db: Database, tokens: TokenIssuer) -> AppState {
        Arc::new(Self {
            db,
            tokens,
            hits: AtomicU64::new(0),
        })
    }
}

/// Run blocking store work off the async runtime.
pub async fn run_blocking<F, T, E>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(Into::into)
}
