use std::sync::Arc;

use tracing::{error, info};

use configs::FolderNames;
use models::{FileMetadata, FolderSet};

use crate::errors::ServiceError;
use crate::sheets::SheetClient;
use crate::store::FileStore;

/// Everything resolved once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct ItineraryContext {
    pub files: Arc<dyn FileStore>,
    pub sheets: SheetClient,
    pub folders: FolderSet,
    pub template_id: String,
}

fn find_named<'a>(files: &'a [FileMetadata], name: &str) -> Option<&'a FileMetadata> {
    files.iter().find(|f| f.name == name)
}

impl ItineraryContext {
    /// Looks up the three well-known folders and the template by name.
    /// Any of them missing is a startup failure.
    pub async fn discover(
        files: Arc<dyn FileStore>,
        sheets: SheetClient,
        names: &FolderNames,
        template_name: &str,
    ) -> Result<Self, ServiceError> {
        let listed = files.list_folders(None).await?;
        let folder_id = |name: &str| -> Result<String, ServiceError> {
            find_named(&listed, name).map(|f| f.id.clone()).ok_or_else(|| {
                error!(folder = %name, "required folder missing");
                ServiceError::Startup(format!("folder `{name}` not found; run the migrate command first"))
            })
        };
        let folders = FolderSet {
            itineraries: folder_id(&names.itineraries)?,
            archives: folder_id(&names.archives)?,
            templates: folder_id(&names.templates)?,
        };

        let templates = files.list_spreadsheets(Some(&folders.templates)).await?;
        let template_id = find_named(&templates, template_name)
            .map(|t| t.id.clone())
            .ok_or_else(|| {
                error!(template = %template_name, "template spreadsheet missing");
                ServiceError::Startup(format!("template `{template_name}` not found in `{}`", names.templates))
            })?;

        info!(
            itineraries = %folders.itineraries,
            archives = %folders.archives,
            templates = %folders.templates,
            %template_id,
            "itinerary context resolved"
        );
        Ok(Self { files, sheets, folders, template_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    fn names() -> FolderNames {
        FolderNames {
            itineraries: "Itineraries".into(),
            archives: "Archives".into(),
            templates: "Templates".into(),
        }
    }

    #[tokio::test]
    async fn missing_folders_fail_startup() {
        let mem = Arc::new(MemoryBackend::new());
        mem.create_folder("Itineraries", None).await.expect("folder");
        let err = ItineraryContext::discover(mem.clone(), SheetClient::new(mem), &names(), "Itinerary")
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, ServiceError::Startup(msg) if msg.contains("Archives")));
    }

    #[tokio::test]
    async fn missing_template_fails_startup() {
        let mem = Arc::new(MemoryBackend::new());
        let root = mem.create_folder("Itineraries", None).await.expect("folder");
        mem.create_folder("Archives", Some(&root.id)).await.expect("folder");
        mem.create_folder("Templates", Some(&root.id)).await.expect("folder");
        let err = ItineraryContext::discover(mem.clone(), SheetClient::new(mem), &names(), "Itinerary")
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, ServiceError::Startup(msg) if msg.contains("Itinerary")));
    }
}
