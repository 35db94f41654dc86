//! Transport domain types
//!
//! One TransportCandidate is a priced, timed option for a route. Candidates
//! are created by the extraction engine and mutated only by the selector,
//! which marks at most one per run as recommended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::normalize;

use super::id::generate_id;

/// Transportation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Flight,
    Train,
    Bus,
    Car,
}

impl TransportMode {
    /// Detect an explicit mode preference in a lowercased prompt
    ///
    /// "by bus" style phrasing and cab/taxi mentions always override route
    /// analysis; bare mode words count too, mirroring how travelers
    /// actually phrase requests.
    pub fn detect_preference(lower: &str) -> Option<Self> {
        if lower.contains("by bus") || lower.contains(" bus ") || lower.ends_with(" bus") {
            return Some(Self::Bus);
        }
        if lower.contains("by train") || lower.contains(" train ") || lower.ends_with(" train") {
            return Some(Self::Train);
        }
        if lower.contains("by cab") || lower.contains("cab") || lower.contains("taxi") {
            return Some(Self::Car);
        }
        if lower.contains("by plane") || lower.contains("by air") {
            return Some(Self::Flight);
        }
        None
    }

    /// Stable tag used in record ids and stage names
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Bus => "bus",
            Self::Car => "car",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Coarse emissions band for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsBand {
    Low,
    Medium,
    High,
}

/// One priced transportation option for a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportCandidate {
    pub id: String,
    pub mode: TransportMode,
    pub origin: String,
    pub destination: String,
    pub provider: String,

    /// Total price for the whole party, USD
    pub price: f64,
    pub price_per_traveler: Option<f64>,

    pub duration_minutes: Option<u32>,
    pub transfers: u32,

    /// Estimated CO2 for the whole party, kg
    pub emissions_kg: Option<f64>,
    pub emissions_band: Option<EmissionsBand>,

    #[serde(default)]
    pub amenities: Vec<String>,

    /// Set only by the route selector
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub recommendation_reason: Option<String>,

    /// Set only by the airport-transfer secondary search
    #[serde(default)]
    pub airport_transfer: bool,
}

impl TransportCandidate {
    /// Build a candidate from one extracted record, dropping it on
    /// unusable data (no positive price)
    pub fn from_raw(
        raw: &Map<String, Value>,
        mode: TransportMode,
        default_origin: &str,
        default_destination: &str,
        travelers: u32,
    ) -> Option<Self> {
        let price = normalize::first_f64(raw, &["price", "total_price", "cost"]).unwrap_or(0.0);
        if price <= 0.0 {
            return None;
        }

        let price_per_traveler = normalize::first_f64(raw, &["price_per_person", "price_per_traveler"])
            .or(if travelers > 0 { Some(price / travelers as f64) } else { None });

        let duration_minutes = normalize::duration_minutes(raw);

        let provider = normalize::first_string(raw, &["provider", "airline", "operator", "carrier", "company"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Unknown {} operator", mode.tag()));

        let transfers = normalize::first_u32(raw, &["transfers", "stops", "connections"]).unwrap_or(0);

        let mut emissions_kg = normalize::first_f64(raw, &["emissions_kg", "carbon_emissions_kg", "co2_kg"]);
        if emissions_kg.is_none() && mode == TransportMode::Flight {
            emissions_kg = duration_minutes.map(|m| estimate_flight_emissions(m, travelers));
        }
        let emissions_band = emissions_kg.map(|kg| {
            if kg > 200.0 {
                EmissionsBand::High
            } else if kg > 50.0 {
                EmissionsBand::Medium
            } else {
                EmissionsBand::Low
            }
        });

        Some(Self {
            id: normalize::first_string(raw, &["id"]).unwrap_or_else(|| generate_id(mode.tag())),
            mode,
            origin: normalize::first_string(raw, &["origin", "from"]).unwrap_or_else(|| default_origin.to_string()),
            destination: normalize::first_string(raw, &["destination", "to"])
                .unwrap_or_else(|| default_destination.to_string()),
            provider,
            price,
            price_per_traveler,
            duration_minutes,
            transfers,
            emissions_kg,
            emissions_band,
            amenities: normalize::string_list(raw.get("amenities")),
            recommended: false,
            recommendation_reason: None,
            airport_transfer: false,
        })
    }
}

/// Rough flight emissions: average cruise speed 800 km/h, 0.25 kg CO2
/// per passenger-km
fn estimate_flight_emissions(duration_minutes: u32, travelers: u32) -> f64 {
    let distance_km = 800.0 * duration_minutes as f64 / 60.0;
    (distance_km * 0.25 * travelers as f64 * 100.0).round() / 100.0
}
