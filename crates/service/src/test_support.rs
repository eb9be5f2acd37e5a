#![cfg(test)]
use std::sync::Arc;

use configs::FolderNames;

use crate::bootstrap::provision;
use crate::itinerary::{ItineraryContext, ItineraryService};
use crate::memory::MemoryBackend;
use crate::sheets::SheetClient;

pub fn folder_names() -> FolderNames {
    FolderNames::default()
}

/// A provisioned in-memory account and the context discovered from it.
pub async fn memory_context() -> (Arc<MemoryBackend>, ItineraryContext) {
    let mem = Arc::new(MemoryBackend::new());
    let sheets = SheetClient::new(mem.clone());
    provision(mem.as_ref(), &sheets, &folder_names(), "Itinerary", None)
        .await
        .expect("provision memory backend");
    let ctx = ItineraryContext::discover(mem.clone(), sheets, &folder_names(), "Itinerary")
        .await
        .expect("discover context");
    (mem, ctx)
}

pub async fn memory_service() -> (Arc<MemoryBackend>, ItineraryService) {
    let (mem, ctx) = memory_context().await;
    (mem, ItineraryService::new(ctx))
}
