//! Domain types for TripMind
//!
//! Core domain types: TripRequest, TripPlan, the per-stage option records,
//! and the stage result envelope passed between pipeline stages.

mod id;
mod plan;
mod records;
mod request;
mod stage;
mod transport;

pub use id::generate_id;
pub use plan::{BudgetBreakdown, DayItinerary, ItineraryEntry, MealEntry, TripPlan};
pub use records::{ActivityOption, DiningOption, GeoPoint, LodgingOption};
pub use request::{TransportPriority, TripRequest};
pub use stage::{StageKind, StageOutput};
pub use transport::{EmissionsBand, TransportCandidate, TransportMode};
