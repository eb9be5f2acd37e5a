//! Backend selection and startup wiring.
//!
//! `connect` builds the file store and spreadsheet clients named by the config;
//! `build_service` additionally resolves the itinerary context. The memory
//! backend starts empty, so it is provisioned before discovery.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use configs::{Backend, GoogleConfig};

use crate::bootstrap::provision;
use crate::errors::ServiceError;
use crate::google::{GoogleDrive, GoogleHttp, GoogleSheets, StaticToken, TokenProvider};
use crate::itinerary::{ItineraryContext, ItineraryService};
use crate::memory::MemoryBackend;
use crate::sheets::SheetClient;
use crate::store::{FileStore, SheetsApi};

#[derive(Clone)]
pub struct Backends {
    pub files: Arc<dyn FileStore>,
    pub sheets: Arc<dyn SheetsApi>,
}

impl Backends {
    pub fn google(cfg: &GoogleConfig) -> Result<Self, ServiceError> {
        let token: Arc<dyn TokenProvider> = Arc::new(StaticToken::new(cfg.access_token.clone())?);
        let http = GoogleHttp::new(token, Duration::from_secs(cfg.request_timeout_secs))?;
        let drive = GoogleDrive::new(http.clone(), &cfg.drive_base_url)?;
        let sheets = GoogleSheets::new(http, &cfg.sheets_base_url)?;
        Ok(Self { files: Arc::new(drive), sheets: Arc::new(sheets) })
    }

    pub fn memory() -> Self {
        let mem = Arc::new(MemoryBackend::new());
        Self { files: mem.clone(), sheets: mem }
    }

    pub fn sheet_client(&self) -> SheetClient {
        SheetClient::new(self.sheets.clone())
    }
}

pub fn connect(cfg: &GoogleConfig) -> Result<Backends, ServiceError> {
    match cfg.backend {
        Backend::Google => Backends::google(cfg),
        Backend::Memory => Ok(Backends::memory()),
    }
}

/// Connects, resolves the folder set and template, and returns the service.
/// Fails when the required folders or the template are missing.
pub async fn build_service(cfg: &GoogleConfig) -> Result<ItineraryService, ServiceError> {
    let backends = connect(cfg)?;
    let sheets = backends.sheet_client();
    if cfg.backend == Backend::Memory {
        let report = provision(
            backends.files.as_ref(),
            &sheets,
            &cfg.folders,
            &cfg.template_name,
            cfg.project_owner.as_deref(),
        )
        .await?;
        info!(template_id = %report.template.id, "memory backend provisioned");
    }
    let ctx = ItineraryContext::discover(backends.files.clone(), sheets, &cfg.folders, &cfg.template_name).await?;
    Ok(ItineraryService::new(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ItineraryStatus;

    #[tokio::test]
    async fn memory_backend_starts_ready_to_serve() {
        let cfg = GoogleConfig { backend: Backend::Memory, ..GoogleConfig::default() };
        let svc = build_service(&cfg).await.expect("service");
        assert!(svc.list(ItineraryStatus::Active).await.expect("list").is_empty());
    }

    #[test]
    fn google_backend_requires_a_token() {
        let cfg = GoogleConfig::default();
        assert!(matches!(connect(&cfg), Err(ServiceError::Startup(_))));
    }
}
