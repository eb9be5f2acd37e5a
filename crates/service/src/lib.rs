//! Service layer: file-store and spreadsheet clients plus the itinerary business rules.
//! - `store` defines the seams to the external Drive/Sheets services.
//! - `google` talks to the real REST APIs, `memory` keeps everything in-process.
//! - `sheets` adds header-aware row operations on top of raw value ranges.
//! - `itinerary` holds the startup context and the business rules.

pub mod errors;
pub mod store;
pub mod google;
pub mod memory;
pub mod sheets;
pub mod itinerary;
pub mod bootstrap;
pub mod observability;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
