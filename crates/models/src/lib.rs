//! Domain types for itineraries stored as spreadsheets.
//!
//! - `Category` selects the sheet and its `Schema`.
//! - `Resource` is the typed row exchanged over HTTP; `resource` also holds
//!   the mapping to and from header-ordered spreadsheet rows.
//! - `ItineraryStatus` is derived from the folder an itinerary lives in.

pub mod errors;
pub mod category;
pub mod schema;
pub mod resource;
pub mod file;
pub mod status;
pub mod itinerary;
pub mod validation;

pub use category::Category;
pub use errors::ModelError;
pub use file::FileMetadata;
pub use itinerary::Itinerary;
pub use resource::{Resource, Row};
pub use schema::Schema;
pub use status::{FolderSet, ItineraryStatus};
