use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use chirpy_api::AppStateInner;

/// Background task that clears refresh sessions past their expiry.
pub async fn run_session_sweep(state: Arc<AppStateInner>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let state = state.clone();
        let result =
            tokio::task::spawn_blocking(move || state.db.expire_sessions_at(chrono::Utc::now()))
                .await;

        match result {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Session sweep: cleared {} expired sessions", count);
                }
            }
            Ok(Err(e)) => warn!("Session sweep error: {}", e),
            Err(e) => warn!("Session sweep join error: {}", e),
        }
    }
}
