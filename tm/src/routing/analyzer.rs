//! Route analyzer - picks the transport mode worth searching
//!
//! Primary path asks the generation service for a structured analysis;
//! any provider or parse failure falls back to geography heuristics over
//! region keyword tables. An explicit user preference always overrides
//! both (enforced by the transportation stage).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::TransportMode;
use crate::extract::{self, ExtractProfile};

const ANALYSIS_PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["recommended_mode"],
    keywords: &[],
    providers: &[],
    limit: 1,
    min_records: 1,
};

/// Outcome of route analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAnalysis {
    pub mode: TransportMode,
    pub reasoning: String,
    pub international: bool,
    pub same_continent: bool,
}

/// Parse a generation-service analysis response; None when the text holds
/// no usable mode
pub fn parse_analysis(text: &str) -> Option<RouteAnalysis> {
    let records = extract::extract(text, &ANALYSIS_PROFILE);
    let record = records.first()?;

    let mode = match record.get("recommended_mode")?.as_str()?.to_lowercase().as_str() {
        "flight" | "plane" | "air" => TransportMode::Flight,
        "train" | "rail" => TransportMode::Train,
        "bus" | "coach" => TransportMode::Bus,
        "car" | "cab" | "taxi" | "rideshare" => TransportMode::Car,
        other => {
            debug!(%other, "parse_analysis: unrecognized mode");
            return None;
        }
    };

    Some(RouteAnalysis {
        mode,
        reasoning: record
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or("Based on route analysis")
            .to_string(),
        international: record
            .get("is_international")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        same_continent: record
            .get("is_same_continent")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    })
}

const US_MARKERS: &[&str] = &[
    "new york", "los angeles", "chicago", "boston", "san francisco", "seattle", "miami", "denver", "usa",
    "united states",
];
const EUROPE_MARKERS: &[&str] = &[
    "london", "paris", "berlin", "zurich", "rome", "madrid", "amsterdam", "vienna", "interlaken", "france",
    "germany", "switzerland", "uk", "italy", "spain",
];
const ASIA_MARKERS: &[&str] = &[
    "tokyo", "seoul", "beijing", "shanghai", "singapore", "bangkok", "kyoto", "japan", "china", "korea",
    "thailand",
];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Region {
    Us,
    Europe,
    Asia,
    Unknown,
}

fn region_of(place: &str) -> Region {
    let lower = place.to_lowercase();
    if US_MARKERS.iter().any(|m| lower.contains(m)) {
        Region::Us
    } else if EUROPE_MARKERS.iter().any(|m| lower.contains(m)) {
        Region::Europe
    } else if ASIA_MARKERS.iter().any(|m| lower.contains(m)) {
        Region::Asia
    } else {
        Region::Unknown
    }
}

/// Geography heuristics used when the analysis call fails
///
/// Same-continent routes bias to rail, cross-ocean to air, and anything
/// naming an airport to road (it is almost certainly a transfer leg).
pub fn fallback_analysis(origin: &str, destination: &str) -> RouteAnalysis {
    debug!(%origin, %destination, "fallback_analysis: called");
    let lower_pair = format!("{} {}", origin.to_lowercase(), destination.to_lowercase());
    if lower_pair.contains("airport") {
        return RouteAnalysis {
            mode: TransportMode::Car,
            reasoning: "Airport transfer over a short distance".to_string(),
            international: false,
            same_continent: true,
        };
    }

    let from = region_of(origin);
    let to = region_of(destination);

    match (from, to) {
        (Region::Europe, Region::Europe) => RouteAnalysis {
            mode: TransportMode::Train,
            reasoning: "European cities with high-speed rail connections".to_string(),
            international: true,
            same_continent: true,
        },
        (Region::Asia, Region::Asia) => RouteAnalysis {
            mode: TransportMode::Train,
            reasoning: "Same-continent route with strong rail links".to_string(),
            international: true,
            same_continent: true,
        },
        (Region::Us, Region::Us) => RouteAnalysis {
            mode: TransportMode::Flight,
            reasoning: "Domestic US route where flights are most practical".to_string(),
            international: false,
            same_continent: true,
        },
        _ => RouteAnalysis {
            mode: TransportMode::Flight,
            reasoning: "Long-haul or cross-ocean route".to_string(),
            international: true,
            same_continent: false,
        },
    }
}
