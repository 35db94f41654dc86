//! Embedded prompt templates
//!
//! Compiled into the binary from .pmt files; the loader prefers on-disk
//! overrides when present.

pub const LODGING: &str = include_str!("../../prompts/lodging.pmt");
pub const DINING: &str = include_str!("../../prompts/dining.pmt");
pub const FLIGHT: &str = include_str!("../../prompts/flight.pmt");
pub const TRAIN: &str = include_str!("../../prompts/train.pmt");
pub const BUS: &str = include_str!("../../prompts/bus.pmt");
pub const CAB: &str = include_str!("../../prompts/cab.pmt");
pub const ACTIVITIES: &str = include_str!("../../prompts/activities.pmt");
pub const ITINERARY: &str = include_str!("../../prompts/itinerary.pmt");
pub const ROUTE_ANALYSIS: &str = include_str!("../../prompts/route-analysis.pmt");

/// Get an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "lodging" => Some(LODGING),
        "dining" => Some(DINING),
        "flight" => Some(FLIGHT),
        "train" => Some(TRAIN),
        "bus" => Some(BUS),
        "cab" => Some(CAB),
        "activities" => Some(ACTIVITIES),
        "itinerary" => Some(ITINERARY),
        "route-analysis" => Some(ROUTE_ANALYSIS),
        _ => None,
    }
}
