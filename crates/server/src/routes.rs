pub mod archives;
pub mod itineraries;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    let (status, body) = service::observability::encode_metrics();
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router. `frontend` is a directory of static assets
/// served for every path the API does not claim.
pub fn build_router(state: AppState, cors: CorsLayer, frontend: Option<&str>) -> Router {
    let api = Router::new()
        .route("/itineraries", get(itineraries::list).post(itineraries::create))
        .route("/itineraries/:id", get(itineraries::get).delete(itineraries::archive))
        .route(
            "/itineraries/:id/:category",
            post(itineraries::add_row).put(itineraries::replace_sheet),
        )
        .route(
            "/itineraries/:id/:category/:index",
            put(itineraries::overwrite_row).delete(itineraries::delete_row),
        )
        .route("/archives", get(archives::list))
        .route("/archives/:id", delete(archives::delete))
        .route("/archives/:id/restore", post(archives::restore))
        .with_state(state);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api);

    if let Some(dir) = frontend {
        let index = format!("{}/index.html", dir.trim_end_matches('/'));
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
