use serde::{Deserialize, Serialize};

use crate::file::FileMetadata;
use crate::resource::Resource;
use crate::status::ItineraryStatus;

/// An itinerary with every row of its three sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(flatten)]
    pub file: FileMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItineraryStatus>,
    /// Activities, then housing, then transportation; sheet order within each.
    pub resources: Vec<Resource>,
}
