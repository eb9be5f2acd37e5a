use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use models::{FileMetadata, ItineraryStatus};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/archives", tag = "archives",
    responses((status = 200, description = "Archived itineraries", body = [crate::openapi::FileMetadataDoc]))
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<FileMetadata>>, JsonApiError> {
    let files = state.itineraries.list(ItineraryStatus::Archived).await?;
    info!(count = files.len(), "list archives");
    Ok(Json(files))
}

#[utoipa::path(
    post, path = "/archives/{id}/restore", tag = "archives",
    params(("id" = String, Path, description = "Spreadsheet id")),
    responses((status = 200, description = "Moved back to the itineraries folder", body = crate::openapi::FileMetadataDoc))
)]
pub async fn restore(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<FileMetadata>, JsonApiError> {
    Ok(Json(state.itineraries.restore(&id).await?))
}

#[utoipa::path(
    delete, path = "/archives/{id}", tag = "archives",
    params(("id" = String, Path, description = "Spreadsheet id")),
    responses(
        (status = 204, description = "Deleted permanently"),
        (status = 403, description = "Itinerary is not archived")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.itineraries.permanently_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
