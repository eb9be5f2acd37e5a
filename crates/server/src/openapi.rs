use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CreateItineraryDoc { pub name: String, pub email: String }

/// Drive file metadata, camelCase as the file store reports it.
#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataDoc {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    pub mime_type: Option<String>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    pub parents: Vec<String>,
}

#[derive(ToSchema)]
pub struct ResourceDoc {
    /// `activity`, `housing` or `transportation`
    pub category: Option<String>,
    /// Filled in on reads only.
    pub index: Option<usize>,
    pub name: String,
    pub itinerary: Option<String>,
    pub location: Option<String>,
    pub location_detail: Option<String>,
    pub location_from: Option<String>,
    pub location_to: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct ItineraryDoc {
    pub id: String,
    pub name: String,
    /// `active` or `archived`
    pub status: Option<String>,
    pub resources: Vec<ResourceDoc>,
}

#[derive(ToSchema)]
pub struct WriteResultDoc { pub updated_cells: u64 }

#[derive(ToSchema)]
pub struct DeleteResultDoc { pub deleted_index: usize }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::itineraries::list,
        crate::routes::itineraries::create,
        crate::routes::itineraries::get,
        crate::routes::itineraries::archive,
        crate::routes::itineraries::add_row,
        crate::routes::itineraries::replace_sheet,
        crate::routes::itineraries::overwrite_row,
        crate::routes::itineraries::delete_row,
        crate::routes::archives::list,
        crate::routes::archives::restore,
        crate::routes::archives::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CreateItineraryDoc,
            FileMetadataDoc,
            ResourceDoc,
            ItineraryDoc,
            WriteResultDoc,
            DeleteResultDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "itineraries"),
        (name = "rows"),
        (name = "archives")
    )
)]
pub struct ApiDoc;
