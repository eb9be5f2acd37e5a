//! Environment/runtime helpers
//!
//! Sanity checks run once at startup.

use tracing::warn;

/// Returns whether the static frontend directory exists; warns when it is missing.
pub async fn frontend_available(frontend_dir: &str) -> bool {
    match tokio::fs::metadata(frontend_dir).await {
        Ok(meta) if meta.is_dir() => true,
        _ => {
            warn!(%frontend_dir, "frontend assets directory not found; only the API is served");
            false
        }
    }
}
