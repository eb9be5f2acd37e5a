//! Itinerary business rules over the file store and the sheet client.

pub mod context;
pub mod service;

pub use context::ItineraryContext;
pub use service::ItineraryService;
