//! Airport-transfer detection helpers
//!
//! When the selected mode is air but the itinerary's true destination is a
//! specific address rather than an airport, the transportation stage runs
//! secondary ground searches from each plausible arrival airport. These
//! helpers hold the pure parts: recognizing such destinations, inferring
//! the airports, and deduplicating the merged results.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::TransportCandidate;

const SPECIFIC_PLACE_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "hotel",
    "hospital",
    "campus",
    "address",
    "street",
    "avenue",
    "road",
];

static AIRPORT_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("static regex"));

/// Whether a destination names a specific place rather than a city or
/// airport
pub fn is_specific_address(destination: &str) -> bool {
    let lower = destination.to_lowercase();
    SPECIFIC_PLACE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Infer arrival airports from flight candidate destinations
///
/// Prefers 3-letter IATA codes; recognizes a few spelled-out airport names;
/// otherwise takes any destination that mentions "airport" verbatim. The
/// set is ordered for deterministic secondary searches.
pub fn infer_airports(flights: &[TransportCandidate]) -> Vec<String> {
    let mut airports = BTreeSet::new();

    for flight in flights {
        let dest = flight.destination.as_str();
        let lower = dest.to_lowercase();

        if let Some(caps) = AIRPORT_CODE_RE.captures(dest) {
            airports.insert(caps[1].to_string());
        } else if lower.contains("kennedy") {
            airports.insert("JFK".to_string());
        } else if lower.contains("laguardia") {
            airports.insert("LGA".to_string());
        } else if lower.contains("newark") {
            airports.insert("EWR".to_string());
        } else if lower.contains("heathrow") {
            airports.insert("LHR".to_string());
        } else if lower.contains("airport") {
            airports.insert(dest.to_string());
        }
    }

    debug!(count = airports.len(), "infer_airports: done");
    airports.into_iter().collect()
}

/// Drop duplicate transfer options and cap the list
///
/// Two options are duplicates when provider, route and price all match
/// (price compared in cents).
pub fn dedup_transfers(options: Vec<TransportCandidate>, cap: usize) -> Vec<TransportCandidate> {
    let mut seen = BTreeSet::new();
    let mut unique = Vec::new();

    for option in options {
        let key = (
            option.provider.clone(),
            option.origin.clone(),
            option.destination.clone(),
            (option.price * 100.0).round() as i64,
        );
        if seen.insert(key) {
            unique.push(option);
        }
        if unique.len() >= cap {
            break;
        }
    }
    unique
}
