use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::runtime;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Bind the configured host, which may be a name such as `localhost` or an IP.
async fn bind_listener(cfg: &AppConfig) -> Result<TcpListener, StartupError> {
    let host = cfg.server.host.as_str();
    TcpListener::bind((host, cfg.server.port))
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("bind {host}:{}: {e}", cfg.server.port)))
}

/// Resolve the itinerary context and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let itineraries = runtime::build_service(&cfg.google)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let frontend = common::env::frontend_available(&cfg.server.frontend_dir)
        .await
        .then_some(cfg.server.frontend_dir.as_str());
    Ok(routes::build_router(AppState::new(itineraries), build_cors(), frontend))
}

/// Public entry: load config, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_env()?;
    run_with(cfg).await
}

pub async fn run_with(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let listener = bind_listener(&cfg).await?;
    let addr = listener.local_addr()?;
    info!(%addr, backend = ?cfg.google.backend, "starting itinerary api");
    axum::serve(listener, app).await?;
    Ok(())
}
