use tracing::{error, info, instrument, warn};

use models::validation::{validate_email, validate_itinerary_name};
use models::{Category, FileMetadata, Itinerary, ItineraryStatus, Resource, Row};

use crate::errors::ServiceError;
use crate::itinerary::context::ItineraryContext;
use crate::store::{FileStore, ShareRole};

/// Itinerary operations, independent of the HTTP layer.
pub struct ItineraryService {
    ctx: ItineraryContext,
}

impl ItineraryService {
    pub fn new(ctx: ItineraryContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ItineraryContext {
        &self.ctx
    }

    /// Copy the template into the itineraries folder, then share the copy with
    /// its owner. The two steps fail separately: a failed share returns
    /// `ShareFailed` carrying the file that now exists unshared.
    #[instrument(skip(self), fields(template_id = %self.ctx.template_id))]
    pub async fn create(&self, name: &str, owner_email: &str) -> Result<FileMetadata, ServiceError> {
        validate_itinerary_name(name)?;
        validate_email(owner_email)?;

        let file = self
            .ctx
            .files
            .copy_file(&self.ctx.template_id, name.trim(), &self.ctx.folders.itineraries)
            .await?;
        info!(itinerary_id = %file.id, "itinerary_created");

        if let Err(e) = self.ctx.files.share_file(&file.id, owner_email.trim(), ShareRole::Writer).await {
            error!(itinerary_id = %file.id, error = %e, "itinerary_share_failed");
            return Err(ServiceError::ShareFailed { file: Box::new(file), source: Box::new(e) });
        }
        info!(itinerary_id = %file.id, "itinerary_shared");
        Ok(file)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, status: ItineraryStatus) -> Result<Vec<FileMetadata>, ServiceError> {
        let folder = self.ctx.folders.folder_for(status);
        self.ctx.files.list_spreadsheets(Some(folder)).await
    }

    /// Metadata, derived status and every non-blank row, activities first,
    /// then housing, then transportation.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Itinerary, ServiceError> {
        let file = self.ctx.files.get_file(id).await?;
        let status = self.ctx.folders.status_of(&file.parents);
        let mut resources = Vec::new();
        for category in Category::ALL {
            let table = self.ctx.sheets.read_range(id, category.sheet_name()).await?;
            for (index, row) in table.rows.iter().enumerate() {
                if is_blank(row) {
                    continue;
                }
                resources.push(Resource::from_row(category, index, row)?);
            }
        }
        Ok(Itinerary { file, status, resources })
    }

    /// Move into the archives folder. The current parent is not checked.
    #[instrument(skip(self))]
    pub async fn archive(&self, id: &str) -> Result<FileMetadata, ServiceError> {
        self.transition(id, ItineraryStatus::archive).await
    }

    /// Move back into the itineraries folder.
    #[instrument(skip(self))]
    pub async fn restore(&self, id: &str) -> Result<FileMetadata, ServiceError> {
        self.transition(id, ItineraryStatus::restore).await
    }

    async fn transition(
        &self,
        id: &str,
        step: fn(ItineraryStatus) -> ItineraryStatus,
    ) -> Result<FileMetadata, ServiceError> {
        let parents = self.ctx.files.get_parents(id).await?;
        let from = self.ctx.folders.status_of(&parents);
        if from.is_none() {
            warn!(itinerary_id = %id, "file is outside the itinerary folders");
        }
        let to = step(from.unwrap_or(ItineraryStatus::Active));
        let file = self.ctx.files.move_file(id, self.ctx.folders.folder_for(to)).await?;
        info!(itinerary_id = %id, ?from, ?to, "itinerary_moved");
        Ok(file)
    }

    /// Hard delete, allowed only while the file sits in the archives folder.
    #[instrument(skip(self))]
    pub async fn permanently_delete(&self, id: &str) -> Result<(), ServiceError> {
        let parents = self.ctx.files.get_parents(id).await?;
        let archived = self
            .ctx
            .folders
            .status_of(&parents)
            .is_some_and(ItineraryStatus::allows_permanent_delete);
        if !archived {
            warn!(itinerary_id = %id, "refusing to delete an itinerary that is not archived");
            return Err(ServiceError::Forbidden(format!("itinerary {id} is not archived")));
        }
        self.ctx.files.delete_file(id).await?;
        info!(itinerary_id = %id, "itinerary_deleted");
        Ok(())
    }

    /// Appends one row; returns the number of cells written.
    #[instrument(skip(self, resource))]
    pub async fn add_row(&self, id: &str, category: Category, resource: &Resource) -> Result<u64, ServiceError> {
        resource.validate_for(category)?;
        self.ctx
            .sheets
            .append_rows(id, category.schema(), &[resource.to_row()])
            .await
    }

    #[instrument(skip(self, resource))]
    pub async fn overwrite_row(
        &self,
        id: &str,
        category: Category,
        index: usize,
        resource: &Resource,
    ) -> Result<u64, ServiceError> {
        resource.validate_for(category)?;
        self.ctx
            .sheets
            .update_row(id, category.schema(), index, &resource.to_row())
            .await
    }

    /// Later rows shift up by one, so indices from an earlier `get` go stale.
    #[instrument(skip(self))]
    pub async fn delete_row(&self, id: &str, category: Category, index: usize) -> Result<(), ServiceError> {
        self.ctx.sheets.delete_row(id, category.schema(), index).await
    }

    /// Replace every data row of one category.
    #[instrument(skip(self, resources), fields(rows = resources.len()))]
    pub async fn replace_sheet(&self, id: &str, category: Category, resources: &[Resource]) -> Result<u64, ServiceError> {
        for resource in resources {
            resource.validate_for(category)?;
        }
        let rows: Vec<Row> = resources.iter().map(Resource::to_row).collect();
        self.ctx.sheets.replace_rows(id, category.schema(), &rows).await
    }
}

fn is_blank(row: &Row) -> bool {
    row.values().all(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use models::ModelError;

    use super::*;
    use crate::memory::MemoryBackend;
    use crate::test_support::{memory_context, memory_service};

    fn louvre() -> Resource {
        Resource { cost: Some(20.0), ..Resource::named(Category::Activity, "Louvre") }
    }

    fn activity(name: &str) -> Resource {
        Resource::named(Category::Activity, name)
    }

    fn names_of(it: &Itinerary, category: Category) -> Vec<String> {
        it.resources
            .iter()
            .filter(|r| r.category == Some(category))
            .map(|r| r.name.clone())
            .collect()
    }

    #[tokio::test]
    async fn paris_trip_scenario() {
        let (mem, svc) = memory_service().await;
        let file = svc.create("Paris Trip", "a@example.com").await.expect("create");
        assert_eq!(file.name, "Paris Trip");
        let perms = mem.permissions(&file.id).await.expect("perms");
        assert_eq!(perms, vec![("a@example.com".to_string(), ShareRole::Writer)]);

        let it = svc.get(&file.id).await.expect("get");
        assert!(it.resources.is_empty());
        assert_eq!(it.status, Some(ItineraryStatus::Active));

        svc.add_row(&file.id, Category::Activity, &louvre()).await.expect("add");
        let it = svc.get(&file.id).await.expect("get");
        assert_eq!(it.resources.len(), 1);
        let row = &it.resources[0];
        assert_eq!(row.category, Some(Category::Activity));
        assert_eq!(row.name, "Louvre");
        assert_eq!(row.cost, Some(20.0));
        assert_eq!(row.index, Some(0));
        assert!(row.location.is_none() && row.date_start.is_none() && row.notes.is_none());
    }

    #[tokio::test]
    async fn new_itinerary_inherits_template_headers() {
        let (_mem, svc) = memory_service().await;
        let file = svc.create("Rome", "b@example.com").await.expect("create");
        let sheets = &svc.context().sheets;
        for category in Category::ALL {
            let copied = sheets.read_header(&file.id, category.sheet_name()).await.expect("header");
            let template = sheets
                .read_header(&svc.context().template_id, category.sheet_name())
                .await
                .expect("header");
            assert_eq!(copied, template);
            assert_eq!(copied, category.schema().header());
        }
    }

    #[tokio::test]
    async fn invalid_create_input_makes_no_remote_call() {
        let (mem, svc) = memory_service().await;
        let before = mem.list_files(None, None).await.expect("list").len();
        assert!(matches!(
            svc.create("Trip", "not-an-email").await,
            Err(ServiceError::Model(ModelError::Validation(_)))
        ));
        assert!(svc.create("   ", "a@example.com").await.is_err());
        assert_eq!(mem.list_files(None, None).await.expect("list").len(), before);
    }

    #[tokio::test]
    async fn archive_and_restore_move_between_lists() {
        let (_mem, svc) = memory_service().await;
        let file = svc.create("Berlin", "c@example.com").await.expect("create");

        svc.archive(&file.id).await.expect("archive");
        let active = svc.list(ItineraryStatus::Active).await.expect("list");
        let archived = svc.list(ItineraryStatus::Archived).await.expect("list");
        assert!(active.iter().all(|f| f.id != file.id));
        assert!(archived.iter().any(|f| f.id == file.id));
        let it = svc.get(&file.id).await.expect("get");
        assert_eq!(it.status, Some(ItineraryStatus::Archived));

        let restored = svc.restore(&file.id).await.expect("restore");
        assert_eq!(restored.parents, vec![svc.context().folders.itineraries.clone()]);
        let active = svc.list(ItineraryStatus::Active).await.expect("list");
        assert!(active.iter().any(|f| f.id == file.id));
    }

    #[tokio::test]
    async fn active_itinerary_cannot_be_deleted() {
        let (mem, svc) = memory_service().await;
        let file = svc.create("Oslo", "d@example.com").await.expect("create");
        assert!(matches!(svc.permanently_delete(&file.id).await, Err(ServiceError::Forbidden(_))));
        assert!(mem.get_file(&file.id).await.is_ok());

        svc.archive(&file.id).await.expect("archive");
        svc.permanently_delete(&file.id).await.expect("delete");
        assert_eq!(mem.get_file(&file.id).await.unwrap_err().upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn overwrite_and_delete_are_positional() {
        let (_mem, svc) = memory_service().await;
        let id = svc.create("Lisbon", "e@example.com").await.expect("create").id;
        for name in ["a", "b", "c", "d"] {
            svc.add_row(&id, Category::Activity, &activity(name)).await.expect("add");
        }
        svc.add_row(&id, Category::Housing, &Resource::named(Category::Housing, "hotel"))
            .await
            .expect("add");

        svc.overwrite_row(&id, Category::Activity, 2, &activity("C")).await.expect("overwrite");
        let it = svc.get(&id).await.expect("get");
        assert_eq!(names_of(&it, Category::Activity), vec!["a", "b", "C", "d"]);

        svc.delete_row(&id, Category::Activity, 1).await.expect("delete");
        let it = svc.get(&id).await.expect("get");
        assert_eq!(names_of(&it, Category::Activity), vec!["a", "C", "d"]);
        let indices: Vec<_> = it
            .resources
            .iter()
            .filter(|r| r.category == Some(Category::Activity))
            .map(|r| r.index)
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(names_of(&it, Category::Housing), vec!["hotel"]);
        assert_eq!(it.resources.last().map(|r| r.category), Some(Some(Category::Housing)));
    }

    #[tokio::test]
    async fn replace_sheet_leaves_exactly_given_rows() {
        let (_mem, svc) = memory_service().await;
        let id = svc.create("Madrid", "f@example.com").await.expect("create").id;
        for name in ["a", "b", "c"] {
            svc.add_row(&id, Category::Activity, &activity(name)).await.expect("add");
        }
        let written = svc
            .replace_sheet(&id, Category::Activity, &[activity("x"), activity("y")])
            .await
            .expect("replace");
        assert_eq!(written, 16);
        let it = svc.get(&id).await.expect("get");
        assert_eq!(names_of(&it, Category::Activity), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn resources_foreign_to_the_sheet_are_rejected() {
        let (_mem, svc) = memory_service().await;
        let id = svc.create("Vienna", "g@example.com").await.expect("create").id;
        let train = Resource {
            location_from: Some("Paris".into()),
            ..Resource::named(Category::Transportation, "TGV")
        };
        assert!(svc.add_row(&id, Category::Activity, &train).await.is_err());
        assert!(svc.add_row(&id, Category::Transportation, &train).await.is_ok());
    }

    struct FailingShare(Arc<MemoryBackend>);

    #[async_trait]
    impl FileStore for FailingShare {
        async fn create_file(&self, name: &str, mime_type: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError> {
            self.0.create_file(name, mime_type, parent).await
        }
        async fn copy_file(&self, file_id: &str, name: &str, parent: &str) -> Result<FileMetadata, ServiceError> {
            self.0.copy_file(file_id, name, parent).await
        }
        async fn move_file(&self, file_id: &str, new_parent: &str) -> Result<FileMetadata, ServiceError> {
            self.0.move_file(file_id, new_parent).await
        }
        async fn list_files(&self, mime_type: Option<&str>, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError> {
            self.0.list_files(mime_type, parent).await
        }
        async fn get_file(&self, file_id: &str) -> Result<FileMetadata, ServiceError> {
            self.0.get_file(file_id).await
        }
        async fn get_parents(&self, file_id: &str) -> Result<Vec<String>, ServiceError> {
            self.0.get_parents(file_id).await
        }
        async fn delete_file(&self, file_id: &str) -> Result<(), ServiceError> {
            self.0.delete_file(file_id).await
        }
        async fn share_file(&self, _file_id: &str, _email: &str, _role: ShareRole) -> Result<(), ServiceError> {
            Err(ServiceError::upstream("drive", 403, "The user does not have sufficient permissions"))
        }
    }

    #[tokio::test]
    async fn share_failure_is_reported_with_the_created_file() {
        let (mem, ctx) = memory_context().await;
        let svc = ItineraryService::new(ItineraryContext { files: Arc::new(FailingShare(mem.clone())), ..ctx });
        let err = svc.create("Prague", "h@example.com").await.unwrap_err();
        let ServiceError::ShareFailed { file, source } = err else {
            panic!("expected ShareFailed");
        };
        assert_eq!(source.upstream_status(), Some(403));
        // the copy exists, unshared
        let stored = mem.get_file(&file.id).await.expect("exists");
        assert_eq!(stored.name, "Prague");
        assert!(mem.permissions(&file.id).await.expect("perms").is_empty());
    }
}
