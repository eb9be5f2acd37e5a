use serde::{Deserialize, Serialize};

/// Lifecycle of an itinerary, derived from the folder holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItineraryStatus {
    Active,
    Archived,
}

impl ItineraryStatus {
    /// Archiving is allowed from any state; it only ever lands in `Archived`.
    pub fn archive(self) -> Self {
        ItineraryStatus::Archived
    }

    pub fn restore(self) -> Self {
        ItineraryStatus::Active
    }

    /// Only archived itineraries may be deleted for good.
    pub fn allows_permanent_delete(self) -> bool {
        self == ItineraryStatus::Archived
    }
}

/// Ids of the three well-known folders, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSet {
    pub itineraries: String,
    pub archives: String,
    pub templates: String,
}

impl FolderSet {
    pub fn folder_for(&self, status: ItineraryStatus) -> &str {
        match status {
            ItineraryStatus::Active => &self.itineraries,
            ItineraryStatus::Archived => &self.archives,
        }
    }

    /// `None` when the file sits in neither the itineraries nor the archives folder.
    pub fn status_of(&self, parents: &[String]) -> Option<ItineraryStatus> {
        if parents.iter().any(|p| *p == self.archives) {
            Some(ItineraryStatus::Archived)
        } else if parents.iter().any(|p| *p == self.itineraries) {
            Some(ItineraryStatus::Active)
        } else {
            None
        }
    }
}
