use thiserror::Error;

use models::{FileMetadata, ModelError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Non-success answer from the Drive or Sheets API; `status` is the remote HTTP status.
    #[error("{api} api error ({status}): {message}")]
    Upstream {
        api: &'static str,
        status: u16,
        message: String,
    },
    #[error("transport error: {0}")]
    Transport(String),
    /// The itinerary was copied but could not be shared with its owner.
    #[error("itinerary {} was created but sharing failed: {source}", .file.id)]
    ShareFailed {
        file: Box<FileMetadata>,
        source: Box<ServiceError>,
    },
    #[error("startup check failed: {0}")]
    Startup(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn upstream(api: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream { api, status, message: message.into() }
    }

    /// Remote status for upstream errors, looking through a failed share.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ServiceError::Upstream { status, .. } => Some(*status),
            ServiceError::ShareFailed { source, .. } => source.upstream_status(),
            _ => None,
        }
    }
}
