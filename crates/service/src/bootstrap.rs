//! One-time provisioning of the folder layout and the template spreadsheet.

use tracing::info;

use configs::FolderNames;
use models::validation::validate_email;
use models::{FileMetadata, FolderSet};

use crate::errors::ServiceError;
use crate::sheets::SheetClient;
use crate::store::{FileStore, ShareRole};

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub folders: FolderSet,
    pub template: FileMetadata,
}

/// Creates the itineraries folder at the root with the archives and templates
/// folders inside it, shares the root with `owner`, then creates and
/// bootstraps the template spreadsheet.
///
/// Meant to run once against an empty account. Nothing checks for an
/// existing layout, so a second run creates duplicates.
pub async fn provision(
    files: &dyn FileStore,
    sheets: &SheetClient,
    names: &FolderNames,
    template_name: &str,
    owner: Option<&str>,
) -> Result<ProvisionReport, ServiceError> {
    if let Some(owner) = owner {
        validate_email(owner)?;
    }

    let root = files.create_folder(&names.itineraries, None).await?;
    let archives = files.create_folder(&names.archives, Some(&root.id)).await?;
    let templates = files.create_folder(&names.templates, Some(&root.id)).await?;
    if let Some(owner) = owner {
        files.share_file(&root.id, owner, ShareRole::Writer).await?;
        info!(folder_id = %root.id, %owner, "shared itineraries folder");
    }

    let template = files.create_spreadsheet(template_name, Some(&templates.id)).await?;
    sheets.bootstrap(&template.id).await?;
    info!(template_id = %template.id, "template provisioned");

    Ok(ProvisionReport {
        folders: FolderSet { itineraries: root.id, archives: archives.id, templates: templates.id },
        template,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::itinerary::ItineraryContext;
    use crate::memory::MemoryBackend;

    fn names() -> FolderNames {
        FolderNames {
            itineraries: "Itineraries".into(),
            archives: "Archives".into(),
            templates: "Templates".into(),
        }
    }

    #[tokio::test]
    async fn provisioned_layout_is_discoverable() {
        let mem = Arc::new(MemoryBackend::new());
        let sheets = SheetClient::new(mem.clone());
        let report = provision(mem.as_ref(), &sheets, &names(), "Itinerary", Some("owner@example.com"))
            .await
            .expect("provision");

        let ctx = ItineraryContext::discover(mem.clone(), sheets, &names(), "Itinerary")
            .await
            .expect("discover");
        assert_eq!(ctx.folders, report.folders);
        assert_eq!(ctx.template_id, report.template.id);

        let archives = mem.get_file(&report.folders.archives).await.expect("archives");
        assert_eq!(archives.parents, vec![report.folders.itineraries.clone()]);
        let perms = mem.permissions(&report.folders.itineraries).await.expect("perms");
        assert_eq!(perms, vec![("owner@example.com".to_string(), ShareRole::Writer)]);
    }

    #[tokio::test]
    async fn bad_owner_is_rejected_before_creating_anything() {
        let mem = Arc::new(MemoryBackend::new());
        let sheets = SheetClient::new(mem.clone());
        let err = provision(mem.as_ref(), &sheets, &names(), "Itinerary", Some("nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        assert!(mem.list_files(None, None).await.expect("list").is_empty());
    }
}
