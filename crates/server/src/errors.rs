use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use models::ModelError;
use service::errors::ServiceError;

/// JSON error body: `{error, detail?, itinerary_id?}` with the mapped status.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary_id: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, detail: Option<String>) -> Self {
        Self { status, error: error.to_string(), detail, itinerary_id: None }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(rejection.body_text()))
    }
}

fn remote_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match e {
            ServiceError::Validation(_) | ServiceError::Model(ModelError::Validation(_)) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", detail)
            }
            ServiceError::NotFound(_) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::Forbidden(_) => JsonApiError::new(StatusCode::FORBIDDEN, "Forbidden", detail),
            ServiceError::Model(ModelError::SchemaMismatch { .. }) => {
                warn!(error = %e, "sheet header does not match schema");
                JsonApiError::new(StatusCode::CONFLICT, "Schema Mismatch", detail)
            }
            ServiceError::Model(ModelError::Malformed { .. }) => {
                JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Malformed Row", detail)
            }
            ServiceError::Upstream { status, .. } => {
                warn!(error = %e, "remote api error");
                JsonApiError::new(remote_status(status), "Upstream Error", detail)
            }
            ServiceError::Transport(_) => {
                error!(error = %e, "remote api unreachable");
                JsonApiError::new(StatusCode::BAD_GATEWAY, "Bad Gateway", detail)
            }
            ServiceError::ShareFailed { ref file, ref source } => {
                let status = source.upstream_status().map(remote_status).unwrap_or(StatusCode::BAD_GATEWAY);
                JsonApiError {
                    itinerary_id: Some(file.id.clone()),
                    ..JsonApiError::new(status, "Share Failed", detail)
                }
            }
            ServiceError::Startup(_) => {
                error!(error = %e, "startup error surfaced in a request");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}
