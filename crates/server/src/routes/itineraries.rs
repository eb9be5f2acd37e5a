use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{Category, FileMetadata, Itinerary, ItineraryStatus, Resource};
use service::errors::ServiceError;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateItineraryInput {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResult {
    pub updated_cells: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted_index: usize,
}

fn parse_category(raw: &str) -> Result<Category, JsonApiError> {
    raw.parse::<Category>()
        .map_err(|e| JsonApiError::from(ServiceError::from(e)))
}

fn parse_index(raw: &str) -> Result<usize, JsonApiError> {
    raw.trim().parse::<usize>().map_err(|_| {
        JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some(format!("row index must be a non-negative integer, got `{raw}`")),
        )
    })
}

#[utoipa::path(
    get, path = "/itineraries", tag = "itineraries",
    responses((status = 200, description = "Active itineraries", body = [crate::openapi::FileMetadataDoc]))
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<FileMetadata>>, JsonApiError> {
    let files = state.itineraries.list(ItineraryStatus::Active).await?;
    info!(count = files.len(), "list itineraries");
    Ok(Json(files))
}

#[utoipa::path(
    post, path = "/itineraries", tag = "itineraries",
    request_body = crate::openapi::CreateItineraryDoc,
    responses(
        (status = 201, description = "Created and shared", body = crate::openapi::FileMetadataDoc),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Created but sharing was refused; body carries itinerary_id")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateItineraryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<FileMetadata>), JsonApiError> {
    let Json(input) = body?;
    let file = state.itineraries.create(&input.name, &input.email).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

#[utoipa::path(
    get, path = "/itineraries/{id}", tag = "itineraries",
    params(("id" = String, Path, description = "Spreadsheet id")),
    responses(
        (status = 200, description = "Metadata, status and rows", body = crate::openapi::ItineraryDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Itinerary>, JsonApiError> {
    Ok(Json(state.itineraries.get(&id).await?))
}

#[utoipa::path(
    delete, path = "/itineraries/{id}", tag = "itineraries",
    params(("id" = String, Path, description = "Spreadsheet id")),
    responses((status = 200, description = "Moved to the archives folder", body = crate::openapi::FileMetadataDoc))
)]
pub async fn archive(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<FileMetadata>, JsonApiError> {
    Ok(Json(state.itineraries.archive(&id).await?))
}

#[utoipa::path(
    post, path = "/itineraries/{id}/{category}", tag = "rows",
    params(
        ("id" = String, Path, description = "Spreadsheet id"),
        ("category" = String, Path, description = "activities, housing or transportation")
    ),
    request_body = crate::openapi::ResourceDoc,
    responses(
        (status = 200, description = "Row appended", body = crate::openapi::WriteResultDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Sheet header does not match the schema")
    )
)]
pub async fn add_row(
    State(state): State<AppState>,
    Path((id, category)): Path<(String, String)>,
    body: Result<Json<Resource>, JsonRejection>,
) -> Result<Json<WriteResult>, JsonApiError> {
    let category = parse_category(&category)?;
    let Json(resource) = body?;
    let updated_cells = state.itineraries.add_row(&id, category, &resource).await?;
    Ok(Json(WriteResult { updated_cells }))
}

#[utoipa::path(
    put, path = "/itineraries/{id}/{category}", tag = "rows",
    params(
        ("id" = String, Path, description = "Spreadsheet id"),
        ("category" = String, Path, description = "activities, housing or transportation")
    ),
    request_body = [crate::openapi::ResourceDoc],
    responses((status = 200, description = "Sheet contents replaced", body = crate::openapi::WriteResultDoc))
)]
pub async fn replace_sheet(
    State(state): State<AppState>,
    Path((id, category)): Path<(String, String)>,
    body: Result<Json<Vec<Resource>>, JsonRejection>,
) -> Result<Json<WriteResult>, JsonApiError> {
    let category = parse_category(&category)?;
    let Json(resources) = body?;
    let updated_cells = state.itineraries.replace_sheet(&id, category, &resources).await?;
    Ok(Json(WriteResult { updated_cells }))
}

#[utoipa::path(
    put, path = "/itineraries/{id}/{category}/{index}", tag = "rows",
    params(
        ("id" = String, Path, description = "Spreadsheet id"),
        ("category" = String, Path, description = "activities, housing or transportation"),
        ("index" = usize, Path, description = "0-based data row")
    ),
    request_body = crate::openapi::ResourceDoc,
    responses(
        (status = 200, description = "Row overwritten", body = crate::openapi::WriteResultDoc),
        (status = 404, description = "No such row")
    )
)]
pub async fn overwrite_row(
    State(state): State<AppState>,
    Path((id, category, index)): Path<(String, String, String)>,
    body: Result<Json<Resource>, JsonRejection>,
) -> Result<Json<WriteResult>, JsonApiError> {
    let category = parse_category(&category)?;
    let Json(resource) = body?;
    let index = parse_index(&index)?;
    let updated_cells = state.itineraries.overwrite_row(&id, category, index, &resource).await?;
    Ok(Json(WriteResult { updated_cells }))
}

#[utoipa::path(
    delete, path = "/itineraries/{id}/{category}/{index}", tag = "rows",
    params(
        ("id" = String, Path, description = "Spreadsheet id"),
        ("category" = String, Path, description = "activities, housing or transportation"),
        ("index" = usize, Path, description = "0-based data row")
    ),
    responses(
        (status = 200, description = "Row removed; later rows shift up", body = crate::openapi::DeleteResultDoc),
        (status = 404, description = "No such row")
    )
)]
pub async fn delete_row(
    State(state): State<AppState>,
    Path((id, category, index)): Path<(String, String, String)>,
) -> Result<Json<DeleteResult>, JsonApiError> {
    let category = parse_category(&category)?;
    let index = parse_index(&index)?;
    state.itineraries.delete_row(&id, category, index).await?;
    Ok(Json(DeleteResult { deleted_index: index }))
}
