//! Per-stage option records
//!
//! Typed records produced by the extraction engine for the lodging, dining
//! and activities stages. Each `from_raw` constructor coerces one extracted
//! JSON object defensively; a record that cannot be coerced is dropped by
//! the caller, never fatal to the batch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::normalize;

use super::id::generate_id;

/// Geographic point; defaults to {0,0} when the source text has none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One lodging option (hotel, rental, guesthouse)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodgingOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub location: GeoPoint,
    pub price_per_night: f64,
    pub total_price: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub rating: Option<f64>,
}

impl LodgingOption {
    pub fn from_raw(raw: &Map<String, Value>, duration_days: u32) -> Option<Self> {
        let name = normalize::first_string(raw, &["title", "name", "property"])?;
        let price_per_night = normalize::first_f64(raw, &["price_per_night", "price", "nightly_rate"]).unwrap_or(0.0);
        let total_price = normalize::first_f64(raw, &["total_price"])
            .unwrap_or(price_per_night * duration_days.max(1) as f64);

        Some(Self {
            id: normalize::first_string(raw, &["id"]).unwrap_or_else(|| generate_id("lodging")),
            name,
            description: normalize::first_string(raw, &["description", "summary"]).unwrap_or_default(),
            address: normalize::first_string(raw, &["address", "location_name"]).unwrap_or_default(),
            location: normalize::location(raw.get("location")),
            price_per_night,
            total_price,
            amenities: normalize::string_list(raw.get("amenities")),
            rating: normalize::first_f64(raw, &["rating", "stars"]),
        })
    }
}

/// One dining option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningOption {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub address: String,
    pub location: GeoPoint,
    /// Price glyphs: "$" through "$$$$"
    pub price_range: String,
    pub average_price_per_person: Option<f64>,
    pub rating: Option<f64>,
}

impl DiningOption {
    pub fn from_raw(raw: &Map<String, Value>) -> Option<Self> {
        let name = normalize::first_string(raw, &["name", "title", "restaurant"])?;
        Some(Self {
            id: normalize::first_string(raw, &["id"]).unwrap_or_else(|| generate_id("dining")),
            name,
            cuisine: normalize::first_string(raw, &["cuisine", "cuisine_type", "type"]).unwrap_or_default(),
            address: normalize::first_string(raw, &["address", "location_name"]).unwrap_or_default(),
            location: normalize::location(raw.get("location")),
            price_range: normalize::first_string(raw, &["price_range"]).unwrap_or_else(|| "$$".to_string()),
            average_price_per_person: normalize::first_f64(raw, &["average_price_per_person", "average_price", "price"]),
            rating: normalize::first_f64(raw, &["rating"]),
        })
    }

    /// Estimate a per-person meal price from the price-range glyphs
    pub fn estimated_price_per_person(&self) -> f64 {
        if let Some(price) = self.average_price_per_person {
            return price;
        }
        match self.price_range.trim() {
            "$" => 15.0,
            "$$" => 35.0,
            "$$$" => 65.0,
            "$$$$" => 100.0,
            _ => 50.0,
        }
    }
}

/// One activity/experience option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub address: String,
    pub location: GeoPoint,
    /// Per-person price; None means free
    pub price: Option<f64>,
    pub duration_hours: Option<f64>,
    pub rating: Option<f64>,
}

impl ActivityOption {
    pub fn from_raw(raw: &Map<String, Value>) -> Option<Self> {
        let name = normalize::first_string(raw, &["name", "title", "activity"])?;
        Some(Self {
            id: normalize::first_string(raw, &["id"]).unwrap_or_else(|| generate_id("activity")),
            name,
            description: normalize::first_string(raw, &["description", "summary"]).unwrap_or_default(),
            category: normalize::first_string(raw, &["category", "type"]).unwrap_or_else(|| "general".to_string()),
            address: normalize::first_string(raw, &["address", "location_name"]).unwrap_or_default(),
            location: normalize::location(raw.get("location")),
            price: normalize::first_f64(raw, &["price", "cost"]),
            duration_hours: normalize::first_f64(raw, &["duration_hours", "hours"]),
            rating: normalize::first_f64(raw, &["rating"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_lodging_from_raw_computes_total() {
        let record = raw(json!({
            "title": "Alpine Chalet",
            "price_per_night": "$180",
            "location": {"lat": 46.7, "lng": 7.9},
            "amenities": ["Wi-Fi"]
        }));
        let lodging = LodgingOption::from_raw(&record, 4).unwrap();
        assert_eq!(lodging.price_per_night, 180.0);
        assert_eq!(lodging.total_price, 720.0);
        assert_eq!(lodging.location.lat, 46.7);
    }

    #[test]
    fn test_lodging_requires_name() {
        let record = raw(json!({"price_per_night": 100}));
        assert!(LodgingOption::from_raw(&record, 3).is_none());
    }

    #[test]
    fn test_lodging_missing_location_defaults_to_origin() {
        let record = raw(json!({"title": "Somewhere"}));
        let lodging = LodgingOption::from_raw(&record, 3).unwrap();
        assert_eq!(lodging.location, GeoPoint::default());
    }

    #[test]
    fn test_dining_price_estimation() {
        let cheap = DiningOption::from_raw(&raw(json!({"name": "Noodle Bar", "price_range": "$"}))).unwrap();
        assert_eq!(cheap.estimated_price_per_person(), 15.0);

        let stated =
            DiningOption::from_raw(&raw(json!({"name": "Bistro", "average_price_per_person": 42.0}))).unwrap();
        assert_eq!(stated.estimated_price_per_person(), 42.0);

        let unknown = DiningOption::from_raw(&raw(json!({"name": "Mystery", "price_range": "???"}))).unwrap();
        assert_eq!(unknown.estimated_price_per_person(), 50.0);
    }

    #[test]
    fn test_activity_from_raw() {
        let record = raw(json!({
            "name": "Glacier hike",
            "category": "hiking",
            "price": "from $95",
            "duration_hours": 6
        }));
        let activity = ActivityOption::from_raw(&record).unwrap();
        assert_eq!(activity.price, Some(95.0));
        assert_eq!(activity.duration_hours, Some(6.0));
        assert_eq!(activity.category, "hiking");
    }
}
