use std::sync::Arc;

use service::itinerary::ItineraryService;

#[derive(Clone)]
pub struct AppState {
    pub itineraries: Arc<ItineraryService>,
}

impl AppState {
    pub fn new(itineraries: ItineraryService) -> Self {
        Self { itineraries: Arc::new(itineraries) }
    }
}
